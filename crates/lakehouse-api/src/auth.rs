//! Function-level key authorization

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use tracing::warn;

use crate::error::ApiError;
use crate::handlers::AppState;

/// Header carrying the function key
pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";
/// Query parameter carrying the function key
pub const FUNCTION_KEY_PARAM: &str = "code";

/// Extractor that admits the request only if it presents the configured
/// function key, either as a header or as the `code` query parameter.
///
/// With no key configured every request is admitted.
#[derive(Debug, Clone, Copy)]
pub struct FunctionKeyAuth;

impl FromRequestParts<Arc<AppState>> for FunctionKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.function_key.as_deref() else {
            return Ok(FunctionKeyAuth);
        };

        let from_header = parts
            .headers
            .get(FUNCTION_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let presented = from_header.or_else(|| {
            Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(mut params)| params.remove(FUNCTION_KEY_PARAM))
        });

        match presented {
            Some(key) if keys_match(&key, expected) => Ok(FunctionKeyAuth),
            Some(_) => {
                warn!("Rejected request with invalid function key");
                Err(ApiError::Unauthorized)
            }
            None => {
                warn!("Rejected request without function key");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Compare without short-circuiting on the first differing byte
fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("abc123", "abc123"));
        assert!(!keys_match("abc124", "abc123"));
        assert!(!keys_match("abc", "abc123"));
        assert!(!keys_match("", "abc123"));
    }
}
