//! Query constraints.
//!
//! Callers describe a query as an ordered list of [`QueryConstraint`]s that
//! compose with logical AND. [`DocumentQuery::compile`] checks the list and
//! turns it into the normalized form backends execute.
//!
//! ```
//! use sadhak_persistence::types::{DocumentQuery, FilterOp, SortDirection, limit, order_by, where_eq, where_field};
//!
//! let query = DocumentQuery::compile(vec![
//!     where_eq("patientId", "p-1"),
//!     where_field("date", FilterOp::Ge, "2025-01-01"),
//!     order_by("date", SortDirection::Descending),
//!     limit(10),
//! ])
//! .unwrap();
//!
//! assert_eq!(query.filters.len(), 2);
//! assert_eq!(query.limit, Some(10));
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BackendError, BackendResult};

use super::pagination::PageCursor;

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("field name pattern"));

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    /// `==`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl FilterOp {
    /// Returns the SQL operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            FilterOp::Eq => "==",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// One query constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryConstraint {
    /// Keep documents whose `field` compares to `value` as `op` says.
    Where {
        /// Field wire name.
        field: String,
        /// Comparison.
        op: FilterOp,
        /// Scalar to compare with.
        value: Value,
    },
    /// Sort by `field`. Documents lacking the field are excluded.
    OrderBy {
        /// Field wire name.
        field: String,
        /// Direction.
        direction: SortDirection,
    },
    /// Return at most this many documents.
    Limit(usize),
    /// Start strictly after the cursor's position.
    StartAfter(PageCursor),
}

/// Builds an equality filter.
pub fn where_eq(field: impl Into<String>, value: impl Into<Value>) -> QueryConstraint {
    where_field(field, FilterOp::Eq, value)
}

/// Builds a filter with any operator.
pub fn where_field(
    field: impl Into<String>,
    op: FilterOp,
    value: impl Into<Value>,
) -> QueryConstraint {
    QueryConstraint::Where {
        field: field.into(),
        op,
        value: value.into(),
    }
}

/// Builds a sort constraint.
pub fn order_by(field: impl Into<String>, direction: SortDirection) -> QueryConstraint {
    QueryConstraint::OrderBy {
        field: field.into(),
        direction,
    }
}

/// Builds a result-count cap.
pub fn limit(n: usize) -> QueryConstraint {
    QueryConstraint::Limit(n)
}

/// Builds a start-after constraint.
pub fn start_after(cursor: PageCursor) -> QueryConstraint {
    QueryConstraint::StartAfter(cursor)
}

/// A compiled filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field wire name.
    pub field: String,
    /// Comparison.
    pub op: FilterOp,
    /// Scalar compared with; `null` only with [`FilterOp::Eq`].
    pub value: Value,
}

/// A compiled sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field wire name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Creates a sort key.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Parses `"date"` / `"-date"` into an ascending / descending key.
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix('-') {
            Some(field) => Self::new(field, SortDirection::Descending),
            None => Self::new(s, SortDirection::Ascending),
        }
    }
}

/// A validated, normalized query.
///
/// Results are ordered by the sort keys in order, then by document id
/// ascending, so every ordering is total and cursors are unambiguous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    /// Filters, all of which must hold.
    pub filters: Vec<Filter>,
    /// Sort keys, most significant first.
    pub order: Vec<SortKey>,
    /// Result-count cap; the last `Limit` constraint wins.
    pub limit: Option<usize>,
    /// Keyset position; the last `StartAfter` constraint wins.
    pub start_after: Option<PageCursor>,
}

impl DocumentQuery {
    /// Compiles constraints, rejecting malformed field names, non-scalar
    /// filter values, range filters on `null`, and cursors that do not match
    /// the sort keys.
    pub fn compile(constraints: impl IntoIterator<Item = QueryConstraint>) -> BackendResult<Self> {
        let mut query = DocumentQuery::default();

        for constraint in constraints {
            match constraint {
                QueryConstraint::Where { field, op, value } => {
                    check_field(&field)?;
                    match &value {
                        Value::Array(_) | Value::Object(_) => {
                            return Err(BackendError::QueryError {
                                message: format!("filter on {field} needs a scalar value"),
                            });
                        }
                        Value::Null if op != FilterOp::Eq => {
                            return Err(BackendError::QueryError {
                                message: format!("{field} {op} null is not a valid filter"),
                            });
                        }
                        _ => {}
                    }
                    query.filters.push(Filter { field, op, value });
                }
                QueryConstraint::OrderBy { field, direction } => {
                    check_field(&field)?;
                    query.order.push(SortKey { field, direction });
                }
                QueryConstraint::Limit(n) => query.limit = Some(n),
                QueryConstraint::StartAfter(cursor) => query.start_after = Some(cursor),
            }
        }

        if let Some(cursor) = &query.start_after {
            if cursor.sort_values().len() != query.order.len() {
                return Err(BackendError::InvalidCursor {
                    cursor: cursor.encode(),
                });
            }
        }

        Ok(query)
    }

    /// Sets the limit, replacing any previous one.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the keyset position.
    pub fn with_start_after(mut self, cursor: Option<PageCursor>) -> Self {
        self.start_after = cursor;
        self
    }
}

fn check_field(field: &str) -> BackendResult<()> {
    if FIELD_NAME.is_match(field) {
        Ok(())
    } else {
        Err(BackendError::QueryError {
            message: format!("invalid field name: {field:?}"),
        })
    }
}
