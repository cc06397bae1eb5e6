//! Pagination types for collection listings.
//!
//! Pagination is keyset-based: a [`PageCursor`] records the sort-key values
//! and document id of the last document a page returned, and the next page
//! starts strictly after that position.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BackendError, BackendResult};

use super::document::StoredDocument;
use super::query::SortKey;

const CURSOR_VERSION: u8 = 1;

/// An opaque cursor for keyset pagination.
///
/// # Encoding
///
/// Cursors are base64-encoded JSON containing:
/// - Sort key values of the last returned document
/// - The document id for tie-breaking
/// - Version information for cursor compatibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Cursor format version.
    version: u8,

    /// The sort key values at the cursor position, one per sort key.
    sort_values: Vec<CursorValue>,

    /// The document id at the cursor position.
    document_id: String,
}

/// A sort key value captured in a cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorValue {
    /// String value.
    String(String),
    /// Integral value.
    Number(i64),
    /// Non-integral value.
    Decimal(f64),
    /// Boolean value.
    Boolean(bool),
}

impl CursorValue {
    /// Captures a JSON field value. Only scalars can be sort keys.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(CursorValue::String(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(CursorValue::Number)
                .or_else(|| n.as_f64().map(CursorValue::Decimal)),
            Value::Bool(b) => Some(CursorValue::Boolean(*b)),
            _ => None,
        }
    }
}

impl PageCursor {
    /// Creates a cursor at the given position.
    pub fn new(sort_values: Vec<CursorValue>, document_id: impl Into<String>) -> Self {
        Self {
            version: CURSOR_VERSION,
            sort_values,
            document_id: document_id.into(),
        }
    }

    /// Creates a cursor positioned at `document` under the given ordering.
    pub fn after(document: &StoredDocument, order: &[SortKey]) -> BackendResult<Self> {
        let sort_values = order
            .iter()
            .map(|key| {
                document
                    .fields
                    .get(&key.field)
                    .and_then(CursorValue::from_json)
                    .ok_or_else(|| BackendError::QueryError {
                        message: format!(
                            "document {} has no scalar value for sort field {}",
                            document.id, key.field
                        ),
                    })
            })
            .collect::<BackendResult<Vec<_>>>()?;
        Ok(Self::new(sort_values, document.id.clone()))
    }

    /// Returns the sort values.
    pub fn sort_values(&self) -> &[CursorValue] {
        &self.sort_values
    }

    /// Returns the document id.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Encodes the cursor to an opaque string.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(&json)
    }

    /// Decodes a cursor from an opaque string.
    pub fn decode(s: &str) -> BackendResult<Self> {
        let invalid = || BackendError::InvalidCursor {
            cursor: s.to_string(),
        };
        let bytes = URL_SAFE_NO_PAD.decode(s).map_err(|_| invalid())?;
        let cursor: PageCursor = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
        if cursor.version != CURSOR_VERSION {
            return Err(invalid());
        }
        Ok(cursor)
    }
}

impl From<&str> for CursorValue {
    fn from(s: &str) -> Self {
        CursorValue::String(s.to_string())
    }
}

impl From<String> for CursorValue {
    fn from(s: String) -> Self {
        CursorValue::String(s)
    }
}

impl From<i64> for CursorValue {
    fn from(n: i64) -> Self {
        CursorValue::Number(n)
    }
}

impl From<f64> for CursorValue {
    fn from(n: f64) -> Self {
        CursorValue::Decimal(n)
    }
}

impl From<bool> for CursorValue {
    fn from(b: bool) -> Self {
        CursorValue::Boolean(b)
    }
}

/// A page of entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items in this page, at most the requested page size.
    pub items: Vec<T>,

    /// Position of the last item, present whenever the page is non-empty.
    pub cursor: Option<String>,

    /// Whether at least one more item follows this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, cursor: Option<String>, has_more: bool) -> Self {
        Self {
            items,
            cursor,
            has_more,
        }
    }

    /// Creates an empty final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: false,
        }
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items of this page.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            cursor: self.cursor,
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::SortDirection;

    #[test]
    fn test_cursor_encode_decode() {
        let cursor = PageCursor::new(
            vec![CursorValue::from("2025-01-20"), CursorValue::from(45)],
            "doc-9",
        );
        let decoded = PageCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
        assert_eq!(decoded.document_id(), "doc-9");
    }

    #[test]
    fn test_invalid_cursor() {
        let err = PageCursor::decode("not-a-cursor!").unwrap_err();
        assert!(matches!(err, BackendError::InvalidCursor { .. }));

        let wrong_version = URL_SAFE_NO_PAD
            .encode(br#"{"version":7,"sort_values":[],"document_id":"x"}"#);
        assert!(PageCursor::decode(&wrong_version).is_err());
    }

    #[test]
    fn test_cursor_after_document() {
        let Value::Object(fields) = json!({ "date": "2025-01-20", "totalAmount": 500.5 }) else {
            unreachable!()
        };
        let doc = StoredDocument::new("pay-1", fields);
        let order = vec![
            SortKey::new("date", SortDirection::Descending),
            SortKey::new("totalAmount", SortDirection::Ascending),
        ];

        let cursor = PageCursor::after(&doc, &order).unwrap();
        assert_eq!(
            cursor.sort_values(),
            &[CursorValue::from("2025-01-20"), CursorValue::Decimal(500.5)]
        );

        let missing = vec![SortKey::new("paidAmount", SortDirection::Ascending)];
        assert!(PageCursor::after(&doc, &missing).is_err());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2], Some("c".to_string()), true).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert!(page.has_more);
        assert!(Page::<u8>::empty().is_empty());
    }
}
