use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio_postgres::types::Json;
use tokio_postgres::Row;
use tracing::instrument;

use crate::db::PgPool;
use crate::error::StoreError;
use crate::matching::cache::{JobMatchRecord, JobseekerMatchRecord, MatchRecord};
use crate::{CandidateId, JobId};

fn record_from_row<K, T>(row: &Row, kind: &'static str, key: K, raw_key: i64) -> Result<MatchRecord<K, T>, StoreError>
where
    T: DeserializeOwned,
{
    let Json(matches): Json<Vec<T>> = row
        .try_get("matches")
        .map_err(|err| StoreError::mapping(kind, raw_key, format!("column matches: {err}")))?;
    let last_updated: DateTime<Utc> = row
        .try_get("last_updated")
        .map_err(|err| StoreError::mapping(kind, raw_key, format!("column last_updated: {err}")))?;

    Ok(MatchRecord {
        key,
        matches,
        last_updated,
    })
}

/// Insert or overwrite the cached ranking for one job.
#[instrument(skip(pool, record), fields(job_id = %record.key, count = record.matches.len()))]
pub async fn upsert_job_matches(pool: &PgPool, record: &JobMatchRecord) -> Result<(), StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "INSERT INTO jobmatch.job_matches (job_id, matches, last_updated)
             VALUES ($1, $2, $3)
             ON CONFLICT (job_id) DO UPDATE
             SET matches = EXCLUDED.matches,
                 last_updated = EXCLUDED.last_updated",
        )
        .await?;

    client
        .execute(&stmt, &[&record.key.0, &Json(&record.matches), &record.last_updated])
        .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn fetch_job_matches(pool: &PgPool, job_id: JobId) -> Result<Option<JobMatchRecord>, StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached("SELECT matches, last_updated FROM jobmatch.job_matches WHERE job_id = $1")
        .await?;

    client
        .query_opt(&stmt, &[&job_id.0])
        .await?
        .map(|row| record_from_row(&row, "job_matches", job_id, job_id.0))
        .transpose()
}

#[instrument(skip(pool))]
pub async fn delete_job_matches(pool: &PgPool, job_id: JobId) -> Result<bool, StoreError> {
    let client = pool.get().await?;
    let deleted = client
        .execute("DELETE FROM jobmatch.job_matches WHERE job_id = $1", &[&job_id.0])
        .await?;
    Ok(deleted > 0)
}

/// Insert or overwrite the cached recommendations for one jobseeker.
#[instrument(skip(pool, record), fields(jobseeker_id = %record.key, count = record.matches.len()))]
pub async fn upsert_jobseeker_matches(
    pool: &PgPool,
    record: &JobseekerMatchRecord,
) -> Result<(), StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "INSERT INTO jobmatch.jobseeker_matches (jobseeker_id, matches, last_updated)
             VALUES ($1, $2, $3)
             ON CONFLICT (jobseeker_id) DO UPDATE
             SET matches = EXCLUDED.matches,
                 last_updated = EXCLUDED.last_updated",
        )
        .await?;

    client
        .execute(&stmt, &[&record.key.0, &Json(&record.matches), &record.last_updated])
        .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn fetch_jobseeker_matches(
    pool: &PgPool,
    jobseeker_id: CandidateId,
) -> Result<Option<JobseekerMatchRecord>, StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(
            "SELECT matches, last_updated FROM jobmatch.jobseeker_matches WHERE jobseeker_id = $1",
        )
        .await?;

    client
        .query_opt(&stmt, &[&jobseeker_id.0])
        .await?
        .map(|row| record_from_row(&row, "jobseeker_matches", jobseeker_id, jobseeker_id.0))
        .transpose()
}

#[instrument(skip(pool))]
pub async fn delete_jobseeker_matches(pool: &PgPool, jobseeker_id: CandidateId) -> Result<bool, StoreError> {
    let client = pool.get().await?;
    let deleted = client
        .execute(
            "DELETE FROM jobmatch.jobseeker_matches WHERE jobseeker_id = $1",
            &[&jobseeker_id.0],
        )
        .await?;
    Ok(deleted > 0)
}
