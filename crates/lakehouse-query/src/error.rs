use thiserror::Error;

/// Unified error type for warehouse operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Connection failed (network, TLS, login)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Token acquisition for the service principal failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A column value could not be converted
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Create a query failure with custom message
    pub fn query_failed(msg: impl Into<String>) -> Self {
        QueryError::QueryFailed(msg.into())
    }

    /// Create a connection failure with custom message
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        QueryError::ConnectionFailed(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        QueryError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
