use std::borrow::Cow;
use std::future::Future;

use axum::{http::StatusCode, response::IntoResponse, Json};
use jm_common::db::{DbPoolError, MigrationError};
use jm_common::error::MatchError;
use jm_common::matching::ConfigError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

tokio::task_local! {
    static REQUEST_ID: String;
}

const MAX_PUBLIC_MESSAGE: usize = 240;

fn redact_token(token: &str) -> &str {
    if token.contains("://") {
        "[redacted-url]"
    } else if token.starts_with('/') || token.contains('\\') {
        "[redacted-path]"
    } else {
        token
    }
}

/// Client-facing form of an error message: single line, bounded, with
/// connection strings and filesystem paths removed.
fn sanitize_message(message: &str) -> String {
    let mut public = String::with_capacity(message.len().min(MAX_PUBLIC_MESSAGE));
    for token in message.split(|c: char| c.is_whitespace() || c.is_control()) {
        if token.is_empty() {
            continue;
        }
        if !public.is_empty() {
            public.push(' ');
        }
        public.push_str(redact_token(token));
    }

    if public.len() > MAX_PUBLIC_MESSAGE {
        let mut cut = MAX_PUBLIC_MESSAGE;
        while !public.is_char_boundary(cut) {
            cut -= 1;
        }
        public.truncate(cut);
        public.push_str("...");
    }

    if public.is_empty() {
        "unexpected error".to_string()
    } else {
        public
    }
}

pub async fn with_request_id<Fut, T>(request_id: Option<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    match request_id {
        Some(request_id) => REQUEST_ID.scope(request_id, fut).await,
        None => fut.await,
    }
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|value| value.clone()).ok()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        let request_id = current_request_id();

        error!(
            code,
            status = %status,
            request_id = request_id.as_deref().unwrap_or(""),
            error = %self,
            "api_error"
        );

        let body = Json(ErrorResponse {
            code,
            message: self.public_message().into_owned(),
            request_id,
        });

        (status, body).into_response()
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unprocessable(_) => "unprocessable_entity",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> Cow<'static, str> {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Unprocessable(msg) => {
                Cow::Owned(sanitize_message(msg))
            }
            ApiError::Unauthorized(_) => Cow::Borrowed("unauthorized"),
            ApiError::ServiceUnavailable(_) => Cow::Borrowed("service unavailable"),
            ApiError::Database(_) | ApiError::Internal(_) => Cow::Borrowed("internal server error"),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(value: MatchError) -> Self {
        match value {
            err @ MatchError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            err @ MatchError::ScoringFailure { .. } => ApiError::Unprocessable(err.to_string()),
            err @ MatchError::Timeout(_) => ApiError::ServiceUnavailable(err.to_string()),
            err @ (MatchError::CacheWrite { .. } | MatchError::Storage(_)) => {
                ApiError::Database(err.to_string())
            }
            MatchError::Config(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(value: ConfigError) -> Self {
        ApiError::Internal(format!("invalid matching configuration: {value}"))
    }
}

impl From<DbPoolError> for ApiError {
    fn from(value: DbPoolError) -> Self {
        ApiError::Database(format!("failed to create pool: {value}"))
    }
}

impl From<MigrationError> for ApiError {
    fn from(value: MigrationError) -> Self {
        ApiError::Database(format!("failed to run migrations: {value}"))
    }
}
