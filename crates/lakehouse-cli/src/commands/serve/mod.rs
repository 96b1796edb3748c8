mod shutdown;

use clap::Args;
use lakehouse_api::{configure_routes, AppState, QUERY_ROUTE};
use lakehouse_query_fabric::{FabricConfig, FabricConnector, DEFAULT_AUTHORITY};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub use shutdown::shutdown_signal;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:7071", env = "LAKEHOUSE_ADDRESS")]
    pub address: String,

    /// Warehouse SQL endpoint host
    #[arg(long, env = "FABRIC_SERVER")]
    pub server: String,

    /// Warehouse SQL endpoint port
    #[arg(long, default_value_t = 1433, env = "FABRIC_PORT")]
    pub port: u16,

    /// Warehouse database name
    #[arg(long, env = "FABRIC_DATABASE")]
    pub database: String,

    /// Entra ID tenant of the service principal
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant_id: String,

    /// Application (client) ID of the service principal
    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub client_id: String,

    /// Client secret of the service principal
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Entra ID authority used to request tokens
    #[arg(long, default_value = DEFAULT_AUTHORITY, env = "AZURE_AUTHORITY_HOST")]
    pub authority: String,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = 30, env = "FABRIC_CONNECT_TIMEOUT")]
    pub connect_timeout_secs: u64,

    /// Key callers must present; the endpoint is open when unset
    #[arg(long, env = "LAKEHOUSE_FUNCTION_KEY", hide_env_values = true)]
    pub function_key: Option<String>,
}

impl ServeCommand {
    fn fabric_config(&self) -> FabricConfig {
        FabricConfig::new(
            self.server.clone(),
            self.database.clone(),
            self.tenant_id.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )
        .with_port(self.port)
        .with_authority(self.authority.clone())
        .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let fabric_config = self.fabric_config();
        debug!("Fabric configuration: {:?}", fabric_config);

        let connector = Arc::new(FabricConnector::new(fabric_config)?);

        let mut state = AppState::new(connector);
        if let Some(key) = self.function_key.clone().filter(|k| !k.is_empty()) {
            state = state.with_function_key(key);
        } else {
            info!("No function key configured, {} is open", QUERY_ROUTE);
        }

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(serve(self.address, Arc::new(state)))
    }
}

async fn serve(address: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = configure_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&address).await?;
    info!("Lakehouse query server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lakehouse query server exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeCommand,
    }

    #[test]
    fn test_serve_args_build_fabric_config() {
        let cli = TestCli::parse_from([
            "lakehouse",
            "--server",
            "example.datawarehouse.fabric.microsoft.com",
            "--database",
            "fut_scraper",
            "--tenant-id",
            "tenant",
            "--client-id",
            "client",
            "--client-secret",
            "secret",
            "--connect-timeout-secs",
            "5",
        ]);

        let config = cli.serve.fabric_config();
        assert_eq!(config.server, "example.datawarehouse.fabric.microsoft.com");
        assert_eq!(config.port, 1433);
        assert_eq!(config.database, "fut_scraper");
        assert_eq!(config.authority, DEFAULT_AUTHORITY);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(cli.serve.address, "127.0.0.1:7071");
        assert!(cli.serve.function_key.is_none());
    }
}
