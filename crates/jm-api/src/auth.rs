use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

/// Proof that the request carried the configured API key.
#[derive(Debug, Clone, Copy)]
pub struct ApiKeyAuth;

#[async_trait]
impl<S> FromRequestParts<S> for ApiKeyAuth
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);
        authorize_api_key(parts, &config)
    }
}

fn authorize_api_key(parts: &Parts, config: &AuthConfig) -> Result<ApiKeyAuth, ApiError> {
    let expected = config
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("JM_API_KEY is not configured".into()))?;

    let provided = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing X-API-Key header".into()))?;

    if provided != expected {
        return Err(ApiError::Unauthorized("invalid API key".into()));
    }
    Ok(ApiKeyAuth)
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(key: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/jobs/1/candidates");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn config(key: Option<&str>) -> AuthConfig {
        AuthConfig {
            api_key: key.map(str::to_string),
        }
    }

    #[test]
    fn accepts_matching_key() {
        assert!(authorize_api_key(&parts(Some("k")), &config(Some("k"))).is_ok());
    }

    #[test]
    fn rejects_missing_or_wrong_key() {
        assert!(matches!(
            authorize_api_key(&parts(None), &config(Some("k"))),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize_api_key(&parts(Some("nope")), &config(Some("k"))),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize_api_key(&parts(Some("k")), &config(None)),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
