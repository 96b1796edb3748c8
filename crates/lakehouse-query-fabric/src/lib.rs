//! Microsoft Fabric warehouse driver for lakehouse-query
//!
//! Connects to the warehouse SQL endpoint over TDS, authenticating as a
//! service principal with an Entra ID access token.

mod auth;
mod config;
mod convert;

pub use auth::{fetch_access_token, SQL_SCOPE};
pub use config::{FabricConfig, DEFAULT_AUTHORITY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};

use async_trait::async_trait;
use lakehouse_query::{QueryError, QueryResult, Result, SqlConnection, SqlConnector};
use tiberius::{AuthMethod, Client, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, error, info};

type TdsClient = Client<Compat<TcpStream>>;

/// Opens service-principal connections to a Fabric warehouse
pub struct FabricConnector {
    config: FabricConfig,
    http: reqwest::Client,
}

impl FabricConnector {
    /// Create a connector after validating the configuration
    pub fn new(config: FabricConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.connect_timeout)
            .build()
            .map_err(|e| QueryError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn tds_config(&self, host: &str, port: u16, token: &str) -> Config {
        let mut config = Config::new();
        config.host(host);
        config.port(port);
        config.database(&self.config.database);
        config.application_name("lakehouse-query");
        config.authentication(AuthMethod::aad_token(token));
        config.encryption(EncryptionLevel::Required);
        config
    }

    async fn open_tcp(&self, addr: String) -> Result<TcpStream> {
        let tcp = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                QueryError::connection_failed(format!(
                    "Timed out after {:?} connecting to {}",
                    self.config.connect_timeout, addr
                ))
            })?
            .map_err(|e| QueryError::connection_failed(format!("{}: {}", addr, e)))?;

        tcp.set_nodelay(true)
            .map_err(|e| QueryError::connection_failed(e.to_string()))?;

        Ok(tcp)
    }

    async fn login(&self, token: &str) -> Result<TdsClient> {
        let config = self.tds_config(&self.config.server, self.config.port, token);
        let tcp = self.open_tcp(config.get_addr()).await?;

        match Client::connect(config, tcp.compat_write()).await {
            Ok(client) => Ok(client),
            // The gateway may hand the session to another node
            Err(tiberius::error::Error::Routing { host, port }) => {
                debug!("Redirected to {}:{}", host, port);
                let config = self.tds_config(&host, port, token);
                let tcp = self.open_tcp(config.get_addr()).await?;
                Client::connect(config, tcp.compat_write())
                    .await
                    .map_err(|e| QueryError::connection_failed(e.to_string()))
            }
            Err(e) => Err(QueryError::connection_failed(e.to_string())),
        }
    }
}

#[async_trait]
impl SqlConnector for FabricConnector {
    fn source_type(&self) -> &'static str {
        "fabric"
    }

    async fn connect(&self) -> Result<Box<dyn SqlConnection>> {
        debug!("Connecting to {}", self.config.connection_string());

        let token = fetch_access_token(&self.http, &self.config).await?;
        let client = self.login(&token).await.map_err(|e| {
            error!("Fabric connection failed: {}", e);
            e
        })?;

        info!(
            "Connected to Fabric warehouse {} on {}",
            self.config.database, self.config.server
        );

        Ok(Box::new(FabricConnection { client }))
    }
}

/// A single TDS session; dropping it closes the socket
pub struct FabricConnection {
    client: TdsClient,
}

#[async_trait]
impl SqlConnection for FabricConnection {
    async fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = std::time::Instant::now();

        debug!("Executing raw SQL: {}", sql);

        let mut stream = self.client.simple_query(sql).await.map_err(|e| {
            error!("Fabric SQL execution failed: {}", e);
            error!("Failed SQL: {}", sql);
            QueryError::query_failed(e.to_string())
        })?;

        let columns: Vec<String> = stream
            .columns()
            .await
            .map_err(|e| QueryError::query_failed(e.to_string()))?
            .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| QueryError::query_failed(e.to_string()))?;

        let data_rows = rows
            .into_iter()
            .map(|row| convert::row_to_datarow(&columns, row))
            .collect::<Result<Vec<_>>>()?;

        let execution_ms = start.elapsed().as_millis() as u64;
        debug!("SQL returned {} rows in {}ms", data_rows.len(), execution_ms);

        Ok(QueryResult::new(columns, data_rows, execution_ms))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| QueryError::connection_failed(format!("Close failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_rejects_invalid_config() {
        let config = FabricConfig::new("", "db", "tenant", "client", "secret");
        let err = FabricConnector::new(config).err().unwrap();
        assert!(matches!(err, QueryError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_tds_config_targets_configured_endpoint() {
        let connector = FabricConnector::new(
            FabricConfig::new("warehouse.example.com", "db", "tenant", "client", "secret")
                .with_port(1444),
        )
        .unwrap();

        let config = connector.tds_config("warehouse.example.com", 1444, "token");
        assert_eq!(config.get_addr(), "warehouse.example.com:1444");
        assert_eq!(connector.source_type(), "fabric");
    }
}
