//! SQL query builder for document queries.
//!
//! Translates a [`DocumentQuery`] into a `SELECT` over the `documents` table.
//! Field values are read with `json_extract`, and every comparison is guarded
//! by `json_type` so a filter only matches values of its own JSON type.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use serde_json::Value;

use crate::schema::ID;
use crate::types::{CursorValue, DocumentQuery, Filter, SortDirection, SortKey};

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL text.
    pub sql: String,
    /// Bound parameter values, numbered `?1..?N` in order.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::String(s) => ToSqlOutput::Owned(SqlValue::Text(s.clone())),
            SqlParam::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            SqlParam::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
        })
    }
}

impl SqlFragment {
    /// Adds a parameter and returns its placeholder.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }
}

/// How a value is read out of a document.
enum FieldExpr<'a> {
    /// The `id` column.
    Id,
    /// A top-level JSON field.
    Json(&'a str),
}

impl<'a> FieldExpr<'a> {
    fn new(field: &'a str) -> Self {
        if field == ID {
            FieldExpr::Id
        } else {
            FieldExpr::Json(field)
        }
    }

    /// Expression yielding the field's SQL value. Field names are validated
    /// identifiers, so they are safe to inline into the JSON path.
    fn value(&self) -> String {
        match self {
            FieldExpr::Id => "id".to_string(),
            FieldExpr::Json(field) => format!("json_extract(data, '$.{}')", field),
        }
    }

    fn json_type(&self) -> String {
        match self {
            FieldExpr::Id => "'text'".to_string(),
            FieldExpr::Json(field) => format!("json_type(data, '$.{}')", field),
        }
    }

    /// Condition that the field holds a non-null scalar.
    fn present(&self) -> String {
        match self {
            FieldExpr::Id => "1".to_string(),
            FieldExpr::Json(_) => format!(
                "{} IN ('integer', 'real', 'text', 'true', 'false')",
                self.json_type()
            ),
        }
    }
}

/// Builds SQL statements for one collection of one project.
pub struct QueryBuilder<'a> {
    project_id: &'a str,
    collection: &'a str,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder.
    pub fn new(project_id: &'a str, collection: &'a str) -> Self {
        Self {
            project_id,
            collection,
        }
    }

    /// Builds the `SELECT id, data` statement for a query.
    pub fn build(&self, query: &DocumentQuery) -> SqlFragment {
        let mut frag = SqlFragment::default();
        let project = frag.add_param(SqlParam::string(self.project_id));
        let collection = frag.add_param(SqlParam::string(self.collection));
        frag.push(&format!(
            "SELECT id, data FROM documents WHERE project_id = {} AND collection = {}",
            project, collection
        ));

        for filter in &query.filters {
            let condition = filter_condition(&mut frag, filter);
            frag.push(&format!(" AND ({})", condition));
        }

        for key in &query.order {
            let presence = FieldExpr::new(&key.field).present();
            if presence != "1" {
                frag.push(&format!(" AND {}", presence));
            }
        }

        if let Some(cursor) = &query.start_after {
            let condition = keyset_condition(
                &mut frag,
                &query.order,
                cursor.sort_values(),
                cursor.document_id(),
            );
            frag.push(&format!(" AND ({})", condition));
        }

        frag.push(" ORDER BY ");
        for key in &query.order {
            let direction = match key.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            frag.push(&format!("{} {}, ", FieldExpr::new(&key.field).value(), direction));
        }
        frag.push("id ASC");

        if let Some(limit) = query.limit {
            let placeholder = frag.add_param(SqlParam::Integer(limit as i64));
            frag.push(&format!(" LIMIT {}", placeholder));
        }

        frag
    }
}

fn filter_condition(frag: &mut SqlFragment, filter: &Filter) -> String {
    let expr = FieldExpr::new(&filter.field);
    let op = filter.op.as_sql();

    match (&expr, &filter.value) {
        (FieldExpr::Id, Value::String(s)) => {
            let p = frag.add_param(SqlParam::string(s.clone()));
            format!("id {} {}", op, p)
        }
        // Ids are always text.
        (FieldExpr::Id, _) => "0".to_string(),
        (_, Value::Null) => format!("{} = 'null'", expr.json_type()),
        (_, Value::Bool(b)) => {
            let p = frag.add_param(SqlParam::Integer(i64::from(*b)));
            format!(
                "{} IN ('true', 'false') AND {} {} {}",
                expr.json_type(),
                expr.value(),
                op,
                p
            )
        }
        (_, Value::Number(n)) => {
            let param = match n.as_i64() {
                Some(i) => SqlParam::Integer(i),
                None => SqlParam::Float(n.as_f64().unwrap_or(f64::NAN)),
            };
            let p = frag.add_param(param);
            format!(
                "{} IN ('integer', 'real') AND {} {} {}",
                expr.json_type(),
                expr.value(),
                op,
                p
            )
        }
        (_, Value::String(s)) => {
            let p = frag.add_param(SqlParam::string(s.clone()));
            format!(
                "{} = 'text' AND {} {} {}",
                expr.json_type(),
                expr.value(),
                op,
                p
            )
        }
        // Rejected when the query is compiled.
        (_, Value::Array(_) | Value::Object(_)) => "0".to_string(),
    }
}

fn cursor_param(value: &CursorValue) -> SqlParam {
    match value {
        CursorValue::String(s) => SqlParam::String(s.clone()),
        CursorValue::Number(n) => SqlParam::Integer(*n),
        CursorValue::Decimal(f) => SqlParam::Float(*f),
        CursorValue::Boolean(b) => SqlParam::Integer(i64::from(*b)),
    }
}

/// Builds "strictly after the cursor" for the ordering `keys, id ASC`:
///
/// ```text
/// (k1 > v1) OR (k1 = v1 AND k2 > v2) OR ... OR (k1 = v1 AND ... AND id > last_id)
/// ```
///
/// with `<` in place of `>` for descending keys.
fn keyset_condition(
    frag: &mut SqlFragment,
    keys: &[SortKey],
    values: &[CursorValue],
    last_id: &str,
) -> String {
    let mut branches = Vec::with_capacity(keys.len() + 1);
    let mut equal_prefix: Vec<String> = Vec::with_capacity(keys.len());

    for (key, value) in keys.iter().zip(values) {
        let expr = FieldExpr::new(&key.field).value();
        let p = frag.add_param(cursor_param(value));
        let past = match key.direction {
            SortDirection::Ascending => ">",
            SortDirection::Descending => "<",
        };

        let mut branch = equal_prefix.clone();
        branch.push(format!("{} {} {}", expr, past, p));
        branches.push(branch.join(" AND "));

        equal_prefix.push(format!("{} = {}", expr, p));
    }

    let p = frag.add_param(SqlParam::string(last_id));
    equal_prefix.push(format!("id > {}", p));
    branches.push(equal_prefix.join(" AND "));

    branches
        .into_iter()
        .map(|b| format!("({})", b))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{FilterOp, PageCursor, limit, order_by, start_after, where_eq, where_field};

    fn build(constraints: Vec<crate::types::QueryConstraint>) -> SqlFragment {
        let query = DocumentQuery::compile(constraints).unwrap();
        QueryBuilder::new("sadhak", "payments").build(&query)
    }

    #[test]
    fn test_base_query() {
        let frag = build(vec![]);
        assert_eq!(
            frag.sql,
            "SELECT id, data FROM documents WHERE project_id = ?1 AND collection = ?2 ORDER BY id ASC"
        );
        assert_eq!(frag.params.len(), 2);
    }

    #[test]
    fn test_typed_filters() {
        let frag = build(vec![
            where_eq("patientId", "p-1"),
            where_field("paidAmount", FilterOp::Ge, 100),
            where_eq("archived", false),
        ]);
        assert!(frag.sql.contains("json_type(data, '$.patientId') = 'text'"));
        assert!(frag.sql.contains("json_extract(data, '$.paidAmount') >= ?4"));
        assert!(frag.sql.contains("json_type(data, '$.archived') IN ('true', 'false')"));
        assert_eq!(frag.params[2], SqlParam::string("p-1"));
        assert_eq!(frag.params[3], SqlParam::Integer(100));
        assert_eq!(frag.params[4], SqlParam::Integer(0));
    }

    #[test]
    fn test_id_filter_uses_column() {
        let frag = build(vec![where_eq("id", "abc")]);
        assert!(frag.sql.contains("(id = ?3)"));

        let frag = build(vec![where_eq("id", json!(5))]);
        assert!(frag.sql.contains("AND (0)"));
    }

    #[test]
    fn test_order_and_limit() {
        let frag = build(vec![order_by("date", SortDirection::Descending), limit(5)]);
        assert!(frag.sql.contains("json_type(data, '$.date') IN ('integer', 'real', 'text', 'true', 'false')"));
        assert!(frag.sql.ends_with("ORDER BY json_extract(data, '$.date') DESC, id ASC LIMIT ?3"));
        assert_eq!(frag.params[2], SqlParam::Integer(5));
    }

    #[test]
    fn test_keyset_condition() {
        let cursor = PageCursor::new(vec![CursorValue::from("2025-01-20")], "pay-7");
        let frag = build(vec![
            order_by("date", SortDirection::Descending),
            start_after(cursor),
        ]);
        assert!(frag.sql.contains(
            "((json_extract(data, '$.date') < ?3) OR (json_extract(data, '$.date') = ?3 AND id > ?4))"
        ));
        assert_eq!(frag.params[3], SqlParam::string("pay-7"));
    }

    #[test]
    fn test_keyset_by_id_only() {
        let frag = build(vec![start_after(PageCursor::new(vec![], "doc-3")), limit(11)]);
        assert!(frag.sql.contains("AND ((id > ?3))"));
        assert!(frag.sql.ends_with("ORDER BY id ASC LIMIT ?4"));
    }
}
