//! HTTP handler for paginated warehouse queries

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use lakehouse_query::{build_paginated_sql, execute_scoped};
use tracing::{debug, error, info};

use super::types::*;
use crate::auth::FunctionKeyAuth;
use crate::error::ApiError;

/// Route path, including the `api` prefix callers already use
pub const QUERY_ROUTE: &str = "/api/queryLakehouse";

/// Configure query routes
pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new().route(QUERY_ROUTE, post(query_lakehouse))
}

/// Run one page of a SELECT statement
pub async fn query_lakehouse(
    _auth: FunctionKeyAuth,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    info!("Processing Lakehouse POST request");

    match run_query(&state, &body).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if e.is_server_error() {
                error!("Error querying Fabric Lakehouse: {}", e);
            } else {
                debug!("Rejected query request: {}", e);
            }
            Err(e)
        }
    }
}

async fn run_query(state: &AppState, body: &[u8]) -> Result<QueryResponse, ApiError> {
    let request = QueryRequest::from_slice(body)?;
    let sql = request.validated_sql()?;
    let page = request.page_request();

    let paginated_sql = build_paginated_sql(sql, page.page, page.page_size);
    debug!("Paginated SQL: {}", paginated_sql);

    let result = execute_scoped(state.connector.as_ref(), &paginated_sql).await?;
    debug!(
        "Page {} returned {} rows with {} columns in {}ms",
        page.page,
        result.row_count(),
        result.columns.len(),
        result.execution_ms
    );

    Ok(QueryResponse {
        page: page.page,
        page_size: page.page_size,
        rows: result.rows,
    })
}
