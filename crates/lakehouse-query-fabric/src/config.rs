//! Connection settings for a Fabric warehouse SQL endpoint

use lakehouse_query::{QueryError, Result};
use std::fmt;
use std::time::Duration;

/// Default TDS port
pub const DEFAULT_PORT: u16 = 1433;
/// Default Entra ID authority used for the client-credentials grant
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to reach a warehouse as a service principal
#[derive(Clone)]
pub struct FabricConfig {
    /// SQL endpoint host, e.g. `xxxx.datawarehouse.fabric.microsoft.com`
    pub server: String,
    pub port: u16,
    pub database: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority: String,
    pub connect_timeout: Duration,
}

impl FabricConfig {
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_PORT,
            database: database.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority: DEFAULT_AUTHORITY.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Reject configurations that can never produce a connection
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("server", &self.server),
            ("database", &self.database),
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("authority", &self.authority),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(QueryError::invalid_configuration(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        if self.port == 0 {
            return Err(QueryError::invalid_configuration("port must not be 0"));
        }

        Ok(())
    }

    /// Token endpoint for the client-credentials grant
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Get connection string for display purposes (without secret)
    pub fn connection_string(&self) -> String {
        format!(
            "mssql://{}@{}:{}/{}",
            self.client_id, self.server, self.port, self.database
        )
    }
}

impl fmt::Debug for FabricConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FabricConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authority", &self.authority)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
