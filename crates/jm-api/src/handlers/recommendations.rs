use axum::{
    extract::{Path, Query, State},
    Json,
};
use jm_common::matching::{JobMatch, RankOptions};
use jm_common::CandidateId;
use serde::{Deserialize, Serialize};

use super::checked_limit;
use crate::auth::ApiKeyAuth;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub cache_only: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub jobseeker_id: CandidateId,
    pub recommendations: Vec<JobMatch>,
}

pub async fn list_recommendations(
    State(state): State<SharedState>,
    Path(jobseeker_id): Path<i64>,
    Query(query): Query<RecommendationQuery>,
    _auth: ApiKeyAuth,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let options = RankOptions {
        limit: checked_limit(query.limit)?,
        cache_only: query.cache_only,
    };

    let jobseeker_id = CandidateId(jobseeker_id);
    let recommendations = state
        .engine
        .rank_jobs_for_jobseeker(jobseeker_id, options)
        .await?;

    Ok(Json(RecommendationsResponse {
        jobseeker_id,
        recommendations,
    }))
}
