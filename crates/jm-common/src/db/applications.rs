use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::instrument;

use crate::db::PgPool;
use crate::error::StoreError;
use crate::{Application, ApplicationId, CandidateId, JobId};

const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, status, match_score, applied_at";

fn application_from_row(row: &Row) -> Result<Application, StoreError> {
    const KIND: &str = ApplicationId::KIND;
    let id: i64 = row
        .try_get("id")
        .map_err(|err| StoreError::mapping(KIND, 0, format!("column id: {err}")))?;
    let mapping = |err: tokio_postgres::Error| StoreError::mapping(KIND, id, err.to_string());

    let job_id: i64 = row.try_get("job_id").map_err(mapping)?;
    let applicant_id: i64 = row.try_get("applicant_id").map_err(mapping)?;
    let status: String = row.try_get("status").map_err(mapping)?;
    let match_score: Option<i16> = row.try_get("match_score").map_err(mapping)?;
    let applied_at: DateTime<Utc> = row.try_get("applied_at").map_err(mapping)?;

    let match_score = match_score
        .map(|score| {
            u8::try_from(score)
                .ok()
                .filter(|score| *score <= 100)
                .ok_or_else(|| StoreError::mapping(KIND, id, format!("match_score {score} out of range")))
        })
        .transpose()?;

    Ok(Application {
        id: ApplicationId(id),
        job_id: JobId(job_id),
        applicant_id: CandidateId(applicant_id),
        status,
        match_score,
        applied_at,
    })
}

#[instrument(skip(pool))]
pub async fn fetch_application(pool: &PgPool, id: ApplicationId) -> Result<Option<Application>, StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM jobmatch.applications WHERE id = $1"
        ))
        .await?;

    client
        .query_opt(&stmt, &[&id.0])
        .await?
        .as_ref()
        .map(application_from_row)
        .transpose()
}

#[instrument(skip(pool))]
pub async fn fetch_applications_for_job(pool: &PgPool, job_id: JobId) -> Result<Vec<Application>, StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM jobmatch.applications WHERE job_id = $1 ORDER BY id"
        ))
        .await?;

    client
        .query(&stmt, &[&job_id.0])
        .await?
        .iter()
        .map(application_from_row)
        .collect()
}

/// Overwrites the score; `false` when no such application exists.
#[instrument(skip(pool))]
pub async fn update_match_score(pool: &PgPool, id: ApplicationId, score: u8) -> Result<bool, StoreError> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            "UPDATE jobmatch.applications SET match_score = $2 WHERE id = $1",
            &[&id.0, &i16::from(score)],
        )
        .await?;
    Ok(updated > 0)
}
