//! Request and response types for the query handler

use std::fmt;
use std::sync::Arc;

use lakehouse_query::{DataRow, PageRequest, SqlConnector};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Application state shared by all requests
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn SqlConnector>,
    /// When set, callers must present this key
    pub function_key: Option<String>,
}

impl AppState {
    pub fn new(connector: Arc<dyn SqlConnector>) -> Self {
        Self {
            connector,
            function_key: None,
        }
    }

    pub fn with_function_key(mut self, key: impl Into<String>) -> Self {
        self.function_key = Some(key.into());
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("connector", &self.connector.source_type())
            .field("function_key", &self.function_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A parsed query request body: `{ "sql": ..., "page": ..., "pageSize": ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// `None` when the key is absent or not a string
    pub sql: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl QueryRequest {
    /// Parse a raw request body.
    ///
    /// Page values may be JSON integers, floats (truncated) or strings holding
    /// an integer. Anything else is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid JSON body: {}", e)))?;

        let object = value.as_object().ok_or_else(|| {
            ApiError::InvalidRequest("Request body must be a JSON object".to_string())
        })?;

        let page = parse_int("page", object.get("page"))?;
        let page_size = parse_int("pageSize", object.get("pageSize"))?;
        let sql = object
            .get("sql")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            sql,
            page,
            page_size,
        })
    }

    /// Page window after defaults, lower bounds and the page-size cap
    pub fn page_request(&self) -> PageRequest {
        PageRequest::normalize(self.page, self.page_size)
    }

    /// Return the statement if it is present and starts with `select`
    pub fn validated_sql(&self) -> Result<&str, ApiError> {
        let sql = match self.sql.as_deref() {
            Some(sql) if !sql.is_empty() => sql,
            _ => return Err(ApiError::MissingSql),
        };

        if !sql.trim().to_lowercase().starts_with("select") {
            return Err(ApiError::SelectOnly);
        }

        Ok(sql)
    }
}

fn parse_int(field: &str, value: Option<&Value>) -> Result<Option<i64>, ApiError> {
    let invalid = |v: &Value| ApiError::InvalidRequest(format!("invalid value for {}: {}", field, v));

    match value {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(|| invalid(&Value::Number(n.clone()))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(&Value::String(s.clone()))),
        Some(v) => Err(invalid(v)),
    }
}

/// Successful response body
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    pub rows: Vec<DataRow>,
}
