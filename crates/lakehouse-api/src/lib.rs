//! lakehouse-api: HTTP surface for paginated warehouse queries
//!
//! Exposes a single `POST /api/queryLakehouse` route that validates a SELECT
//! statement, rewrites it into one OFFSET/FETCH page and runs it through an
//! injected `SqlConnector`.

pub mod auth;
pub mod error;
pub mod handlers;

pub use auth::FunctionKeyAuth;
pub use error::ApiError;
pub use handlers::{configure_routes, AppState, QueryRequest, QueryResponse, QUERY_ROUTE};
