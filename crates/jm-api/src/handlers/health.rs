use std::sync::atomic::Ordering;

use axum::{extract::State, Json};
use jm_common::db::PgPool;
use serde_json::json;
use tokio::time::{timeout, Duration};

use crate::error::ApiError;
use crate::SharedState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ping_database(pool: &PgPool) -> Result<(), ApiError> {
    let client = match timeout(READINESS_TIMEOUT, pool.get()).await {
        Err(_) => return Err(ApiError::ServiceUnavailable("db_pool_timeout".into())),
        Ok(Err(err)) => {
            return Err(ApiError::ServiceUnavailable(format!("db_pool_checkout: {err}")));
        }
        Ok(Ok(client)) => client,
    };

    match timeout(READINESS_TIMEOUT, client.simple_query("SELECT 1")).await {
        Err(_) => Err(ApiError::ServiceUnavailable("db_ping_timeout".into())),
        Ok(Err(err)) => Err(ApiError::ServiceUnavailable(format!("db_ping: {err}"))),
        Ok(Ok(_)) => Ok(()),
    }
}

/// Ready once the database answers and shutdown has not begun. Also echoes
/// the active ranking settings so operators can confirm what was loaded.
pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    ping_database(&state.pool).await?;

    let matching = state.engine.config();
    Ok(Json(json!({
        "status": "ok",
        "database": "ok",
        "application": env!("CARGO_PKG_NAME"),
        "min_match_score": matching.min_match_score,
        "cache_limit": matching.cache_limit,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn readyz_rejects_when_readiness_disabled() {
        let state = crate::test_state("test-key");
        state.readiness.store(false, Ordering::SeqCst);

        match readyz(State(state)).await {
            Err(ApiError::ServiceUnavailable(code)) => assert!(code.contains("shutting_down")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
