use crate::error::Result;
use crate::types::QueryResult;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Opens connections to a warehouse.
///
/// Implementations hold only immutable configuration, so one connector is
/// shared across all requests.
#[async_trait]
pub trait SqlConnector: Send + Sync {
    /// Get the type name of this connector
    fn source_type(&self) -> &'static str;

    /// Open a new connection, ready to run statements
    async fn connect(&self) -> Result<Box<dyn SqlConnection>>;
}

/// A live connection owned by a single request.
///
/// Dropping a connection must release it; `close` does the same thing
/// gracefully and reports failures.
#[async_trait]
pub trait SqlConnection: Send {
    /// Execute raw SQL and fetch the first result set in full
    async fn query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Close the connection gracefully
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Open a connection, run `sql` on it and close it again.
///
/// The connection is closed whether or not the statement succeeded. A close
/// failure after a successful query is logged and does not discard the rows;
/// after a failed query the query error wins.
pub async fn execute_scoped(connector: &dyn SqlConnector, sql: &str) -> Result<QueryResult> {
    let mut connection = connector.connect().await?;
    debug!("Opened {} connection", connector.source_type());

    let result = connection.query(sql).await;

    if let Err(e) = connection.close().await {
        warn!("Failed to close {} connection: {}", connector.source_type(), e);
    }

    result
}
