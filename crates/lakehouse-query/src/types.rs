use serde::ser::{Serialize, SerializeMap, Serializer};

/// Page used when the request does not name one
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the request does not name one
pub const DEFAULT_PAGE_SIZE: u64 = 50;
/// Larger page sizes are silently reduced to this value
pub const MAX_PAGE_SIZE: u64 = 200;

/// A normalized, 1-indexed page window
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Build a page request, clamping both values into their valid ranges
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Normalize raw request values, applying defaults for missing ones
    pub fn normalize(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.map(|p| p.max(1) as u64).unwrap_or(DEFAULT_PAGE);
        let page_size = page_size
            .map(|s| s.max(1) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page, page_size)
    }

    /// Number of rows skipped before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// A single column value as it appears in the JSON response
///
/// Values that have no JSON counterpart (decimals, binary, GUIDs, dates) are
/// rendered as strings by the driver before they get here.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Date/time rendered as text
    Timestamp(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::String(s) | CellValue::Timestamp(s) => serializer.serialize_str(s),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            CellValue::Float(_) => serializer.serialize_unit(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// A row of data as ordered column/value pairs
///
/// Column order follows the result set. Inserting a name that is already
/// present replaces its value but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    cells: Vec<(String, CellValue)>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();

        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for DataRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = DataRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for DataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of executing a query
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names in result-set order
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<DataRow>,
    /// Query execution time in milliseconds
    pub execution_ms: u64,
}

impl QueryResult {
    /// Create a new query result
    pub fn new(columns: Vec<String>, rows: Vec<DataRow>, execution_ms: u64) -> Self {
        Self {
            columns,
            rows,
            execution_ms,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let page = PageRequest::normalize(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 50);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_request_clamps_page_size() {
        let page = PageRequest::normalize(Some(1), Some(500));
        assert_eq!(page.page_size, 200);
    }

    #[test]
    fn test_page_request_lower_bounds() {
        let page = PageRequest::normalize(Some(0), Some(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);

        let page = PageRequest::normalize(Some(-4), Some(-10));
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(2, 10).offset(), 10);
        assert_eq!(PageRequest::new(5, 200).offset(), 800);
        assert_eq!(PageRequest::new(u64::MAX, 200).offset(), u64::MAX);
    }

    #[test]
    fn test_page_request_offset_with_zero_page() {
        let page = PageRequest {
            page: 0,
            page_size: 25,
        };
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_data_row_preserves_column_order() {
        let mut row = DataRow::new();
        row.insert("zeta", 1);
        row.insert("alpha", "a");
        row.insert("mid", true);

        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"a","mid":true}"#);
    }

    #[test]
    fn test_data_row_duplicate_column_overwrites_in_place() {
        let mut row = DataRow::new();
        row.insert("id", 1);
        row.insert("name", "first");
        row.insert("id", 2);

        assert_eq!(row.columns().count(), 2);
        assert_eq!(row.get("id"), Some(&CellValue::Int(2)));
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":2,"name":"first"}"#);
    }

    #[test]
    fn test_cell_value_json_rendering() {
        let row: DataRow = vec![
            ("n", CellValue::Null),
            ("s", CellValue::from("text")),
            ("i", CellValue::Int(-7)),
            ("f", CellValue::Float(1.5)),
            ("nan", CellValue::Float(f64::NAN)),
            ("b", CellValue::Bool(false)),
            ("ts", CellValue::Timestamp("2024-03-01 12:30:00".to_string())),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "n": null,
                "s": "text",
                "i": -7,
                "f": 1.5,
                "nan": null,
                "b": false,
                "ts": "2024-03-01 12:30:00"
            })
        );
    }

    #[test]
    fn test_cell_value_from_option() {
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(3i64)), CellValue::Int(3));
        assert!(CellValue::from(None::<String>).is_null());
    }
}
