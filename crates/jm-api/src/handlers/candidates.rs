use axum::{
    extract::{Path, Query, State},
    Json,
};
use jm_common::matching::{CandidateMatch, RankOptions};
use jm_common::{Application, ApplicationId, CandidateId, JobId};
use serde::{Deserialize, Serialize};

use super::checked_limit;
use crate::auth::ApiKeyAuth;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct CandidateQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub cache_only: bool,
    /// Restrict to people who applied, scored per application.
    #[serde(default)]
    pub only_applied: bool,
}

#[derive(Debug, Serialize)]
pub struct CandidateEntry {
    pub candidate_id: CandidateId,
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<CandidateMatch> for CandidateEntry {
    fn from(value: CandidateMatch) -> Self {
        Self {
            candidate_id: value.candidate_id,
            score: Some(value.score),
            application_id: None,
            status: None,
        }
    }
}

impl From<Application> for CandidateEntry {
    fn from(value: Application) -> Self {
        Self {
            candidate_id: value.applicant_id,
            score: value.match_score,
            application_id: Some(value.id),
            status: Some(value.status),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub job_id: JobId,
    pub candidates: Vec<CandidateEntry>,
}

pub async fn list_candidates(
    State(state): State<SharedState>,
    Path(job_id): Path<i64>,
    Query(query): Query<CandidateQuery>,
    _auth: ApiKeyAuth,
) -> Result<Json<CandidatesResponse>, ApiError> {
    let job_id = JobId(job_id);
    let limit = checked_limit(query.limit)?;

    let candidates: Vec<CandidateEntry> = if query.only_applied {
        let limit = limit.unwrap_or(state.engine.config().default_limit);
        state
            .applications
            .applicant_scores_for_job(job_id)
            .await?
            .into_iter()
            .take(limit)
            .map(CandidateEntry::from)
            .collect()
    } else {
        let options = RankOptions {
            limit,
            cache_only: query.cache_only,
        };
        state
            .engine
            .rank_candidates_for_job(job_id, options)
            .await?
            .into_iter()
            .map(CandidateEntry::from)
            .collect()
    };

    Ok(Json(CandidatesResponse { job_id, candidates }))
}
