//! # lakehouse-query
//!
//! Core abstractions for running paginated read-only SQL against a remote
//! warehouse.
//!
//! This crate has no I/O of its own. It provides:
//! - **pagination**: the rewriter that wraps a SELECT statement in an
//!   `OFFSET ... FETCH NEXT ...` window
//! - **types**: page requests, cell values and ordered result rows
//! - **traits**: the `SqlConnector` / `SqlConnection` seam implemented by
//!   database drivers
//!
//! ## Example
//!
//! ```rust
//! use lakehouse_query::{build_paginated_sql, PageRequest};
//!
//! let page = PageRequest::new(2, 10);
//! let sql = build_paginated_sql("SELECT * FROM t", page.page, page.page_size);
//!
//! assert!(sql.contains("ORDER BY (SELECT NULL)"));
//! assert!(sql.contains("OFFSET 10 ROWS FETCH NEXT 10 ROWS ONLY"));
//! ```
//!
//! Driver crates:
//! - `lakehouse-query-fabric` - Microsoft Fabric / SQL Server over TDS

pub mod error;
pub mod pagination;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{QueryError, Result};
pub use pagination::{build_paginated_sql, split_order_by, DEFAULT_ORDER_BY};
pub use traits::{execute_scoped, SqlConnection, SqlConnector};
pub use types::{
    CellValue, DataRow, PageRequest, QueryResult, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
