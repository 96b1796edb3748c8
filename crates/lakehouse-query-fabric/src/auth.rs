//! Service-principal token acquisition (OAuth2 client-credentials grant)

use crate::config::FabricConfig;
use lakehouse_query::{QueryError, Result};
use serde::Deserialize;
use tracing::{debug, error};

/// Scope granting access to Azure SQL and Fabric SQL endpoints
pub const SQL_SCOPE: &str = "https://database.windows.net/.default";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Fetch a fresh access token for the SQL endpoint
pub async fn fetch_access_token(http: &reqwest::Client, config: &FabricConfig) -> Result<String> {
    let url = config.token_url();
    debug!("Requesting access token for client {}", config.client_id);

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("scope", SQL_SCOPE),
    ];

    let response = http.post(&url).form(&form).send().await.map_err(|e| {
        QueryError::AuthenticationFailed(format!("Token request failed: {}", e))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        QueryError::AuthenticationFailed(format!("Failed to read token response: {}", e))
    })?;

    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => body,
        };
        error!("Token endpoint returned {}: {}", status, message);
        return Err(QueryError::AuthenticationFailed(format!(
            "Token endpoint returned {}: {}",
            status, message
        )));
    }

    let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        QueryError::AuthenticationFailed(format!("Malformed token response: {}", e))
    })?;

    debug!("Obtained access token (expires in {:?}s)", token.expires_in);

    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Form, Json, Router};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn spawn_authority(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config_for(authority: &str) -> FabricConfig {
        FabricConfig::new("server", "db", "tenant-1", "client-1", "secret-1")
            .with_authority(authority)
    }

    #[tokio::test]
    async fn test_fetch_access_token_sends_client_credentials() {
        let app = Router::new().route(
            "/tenant-1/oauth2/v2.0/token",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                assert_eq!(form["grant_type"], "client_credentials");
                assert_eq!(form["client_id"], "client-1");
                assert_eq!(form["client_secret"], "secret-1");
                assert_eq!(form["scope"], SQL_SCOPE);
                Json(serde_json::json!({
                    "token_type": "Bearer",
                    "expires_in": 3599,
                    "access_token": "token-abc"
                }))
            }),
        );
        let authority = spawn_authority(app).await;

        let token = fetch_access_token(&reqwest::Client::new(), &config_for(&authority))
            .await
            .unwrap();
        assert_eq!(token, "token-abc");
    }

    #[tokio::test]
    async fn test_fetch_access_token_reports_error_description() {
        let app = Router::new().route(
            "/tenant-1/oauth2/v2.0/token",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": "invalid_client",
                        "error_description": "AADSTS7000215: Invalid client secret provided."
                    })),
                )
            }),
        );
        let authority = spawn_authority(app).await;

        let err = fetch_access_token(&reqwest::Client::new(), &config_for(&authority))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Authentication failed: Token endpoint returned 401"));
        assert!(message.contains("invalid_client: AADSTS7000215"));
    }
}
