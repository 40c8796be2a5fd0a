use axum::{
    extract::{Path, State},
    Json,
};
use jm_common::matching::ScoreBreakdown;
use jm_common::ApplicationId;
use serde::Serialize;

use crate::auth::ApiKeyAuth;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct StoredScoreResponse {
    pub application_id: ApplicationId,
    pub match_score: u8,
}

#[derive(Debug, Serialize)]
pub struct ScoredApplicationResponse {
    pub application_id: ApplicationId,
    pub match_score: u8,
    pub breakdown: ScoreBreakdown,
}

/// Stored score, computed on first read.
pub async fn get_score(
    State(state): State<SharedState>,
    Path(application_id): Path<i64>,
    _auth: ApiKeyAuth,
) -> Result<Json<StoredScoreResponse>, ApiError> {
    let application_id = ApplicationId(application_id);
    let match_score = state.applications.cached_or_score(application_id).await?;

    Ok(Json(StoredScoreResponse {
        application_id,
        match_score,
    }))
}

/// Recomputes and overwrites the stored score.
pub async fn refresh_score(
    State(state): State<SharedState>,
    Path(application_id): Path<i64>,
    _auth: ApiKeyAuth,
) -> Result<Json<ScoredApplicationResponse>, ApiError> {
    let application_id = ApplicationId(application_id);
    let score = state.applications.score_application(application_id).await?;

    Ok(Json(ScoredApplicationResponse {
        application_id,
        match_score: score.total,
        breakdown: score.breakdown,
    }))
}
