use async_stream::stream;
use futures::Stream;
use tokio_postgres::types::{FromSqlOwned, Json};
use tokio_postgres::Row;
use tracing::{debug, instrument};

use crate::db::PgPool;
use crate::error::StoreError;
use crate::{
    AvailabilitySlot, Candidate, CandidateId, EducationRecord, ExperienceEntry, ExperienceTier,
    GeoPoint, JobId, JobPosting, JobStatus,
};

/// Rows pulled per round trip while streaming a population.
pub const DEFAULT_FETCH_BATCH: i32 = 500;

const CANDIDATE_COLUMNS: &str = "id, skills, total_experience_years, experience, education, \
     availability, longitude, latitude, preferred_salary, preferred_industry, accepts_remote, \
     profile_completed";

const JOB_COLUMNS: &str = "id, title, skills_required, education, experience_level, availability, \
     longitude, latitude, remote_option, min_salary, max_salary, industry, status";

fn column<T: FromSqlOwned>(row: &Row, kind: &'static str, id: i64, name: &str) -> Result<T, StoreError> {
    row.try_get(name)
        .map_err(|err| StoreError::mapping(kind, id, format!("column {name}: {err}")))
}

fn point(longitude: Option<f64>, latitude: Option<f64>) -> Option<GeoPoint> {
    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Some(GeoPoint::new(longitude, latitude)),
        _ => None,
    }
}

pub(crate) fn candidate_from_row(row: &Row) -> Result<Candidate, StoreError> {
    const KIND: &str = CandidateId::KIND;
    let id: i64 = row
        .try_get("id")
        .map_err(|err| StoreError::mapping(KIND, 0, format!("column id: {err}")))?;

    let Json(experience): Json<Vec<ExperienceEntry>> = column(row, KIND, id, "experience")?;
    let Json(education): Json<Vec<EducationRecord>> = column(row, KIND, id, "education")?;
    let Json(availability): Json<Vec<AvailabilitySlot>> = column(row, KIND, id, "availability")?;

    Ok(Candidate {
        id: CandidateId(id),
        skills: column(row, KIND, id, "skills")?,
        total_experience_years: column(row, KIND, id, "total_experience_years")?,
        experience,
        education,
        availability,
        location: point(
            column(row, KIND, id, "longitude")?,
            column(row, KIND, id, "latitude")?,
        ),
        preferred_salary: column(row, KIND, id, "preferred_salary")?,
        preferred_industry: column(row, KIND, id, "preferred_industry")?,
        accepts_remote: column(row, KIND, id, "accepts_remote")?,
        profile_completed: column(row, KIND, id, "profile_completed")?,
    })
}

pub(crate) fn job_from_row(row: &Row) -> Result<JobPosting, StoreError> {
    const KIND: &str = JobId::KIND;
    let id: i64 = row
        .try_get("id")
        .map_err(|err| StoreError::mapping(KIND, 0, format!("column id: {err}")))?;

    let Json(availability): Json<Vec<AvailabilitySlot>> = column(row, KIND, id, "availability")?;
    let level: String = column(row, KIND, id, "experience_level")?;
    let status: String = column(row, KIND, id, "status")?;
    let status: JobStatus = status
        .parse()
        .map_err(|_| StoreError::mapping(KIND, id, format!("unknown status {status:?}")))?;

    Ok(JobPosting {
        id: JobId(id),
        title: column(row, KIND, id, "title")?,
        skills_required: column(row, KIND, id, "skills_required")?,
        education: column(row, KIND, id, "education")?,
        experience_tier: ExperienceTier::from_label(&level),
        availability,
        location: point(
            column(row, KIND, id, "longitude")?,
            column(row, KIND, id, "latitude")?,
        ),
        remote_option: column(row, KIND, id, "remote_option")?,
        min_salary: column(row, KIND, id, "min_salary")?,
        max_salary: column(row, KIND, id, "max_salary")?,
        industry: column(row, KIND, id, "industry")?,
        status,
    })
}

#[instrument(skip(pool))]
pub async fn fetch_job(pool: &PgPool, id: JobId) -> Result<Option<JobPosting>, StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(&format!("SELECT {JOB_COLUMNS} FROM jobmatch.jobs WHERE id = $1"))
        .await?;
    client
        .query_opt(&stmt, &[&id.0])
        .await?
        .as_ref()
        .map(job_from_row)
        .transpose()
}

#[instrument(skip(pool))]
pub async fn fetch_candidate(pool: &PgPool, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
    let client = pool.get().await?;
    let stmt = client
        .prepare_cached(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM jobmatch.jobseekers WHERE id = $1"
        ))
        .await?;
    client
        .query_opt(&stmt, &[&id.0])
        .await?
        .as_ref()
        .map(candidate_from_row)
        .transpose()
}

/// Streams the rows of `sql` through a server-side portal, `batch` rows per
/// round trip, inside a read-only transaction held for the life of the
/// stream. Connection, transaction and portal failures end the stream after
/// one error; a row that fails to map yields its error and the scan goes on.
fn portal_stream<T>(
    pool: PgPool,
    sql: String,
    batch: i32,
    map: fn(&Row) -> Result<T, StoreError>,
) -> impl Stream<Item = Result<T, StoreError>> + Send + 'static
where
    T: Send + 'static,
{
    let batch = batch.max(1);

    stream! {
        let mut client = match pool.get().await {
            Ok(client) => client,
            Err(err) => {
                yield Err(StoreError::from(err));
                return;
            }
        };

        let tx = match client
            .build_transaction()
            .read_only(true)
            .start()
            .await
        {
            Ok(tx) => tx,
            Err(err) => {
                yield Err(StoreError::from(err));
                return;
            }
        };

        let portal = match tx.bind(sql.as_str(), &[]).await {
            Ok(portal) => portal,
            Err(err) => {
                yield Err(StoreError::from(err));
                return;
            }
        };

        let mut fetched = 0usize;
        loop {
            let rows = match tx.query_portal(&portal, batch).await {
                Ok(rows) => rows,
                Err(err) => {
                    yield Err(StoreError::from(err));
                    return;
                }
            };

            let exhausted = rows.len() < batch as usize;
            fetched += rows.len();
            for row in &rows {
                yield map(row);
            }

            if exhausted {
                break;
            }
        }

        debug!(fetched, "population scan drained");
        // Dropping the transaction rolls it back; nothing was written.
    }
}

pub fn stream_completed_candidates(
    pool: PgPool,
    batch: i32,
) -> impl Stream<Item = Result<Candidate, StoreError>> + Send + 'static {
    portal_stream(
        pool,
        format!(
            "SELECT {CANDIDATE_COLUMNS} FROM jobmatch.jobseekers \
             WHERE profile_completed ORDER BY id"
        ),
        batch,
        candidate_from_row,
    )
}

pub fn stream_active_jobs(
    pool: PgPool,
    batch: i32,
) -> impl Stream<Item = Result<JobPosting, StoreError>> + Send + 'static {
    portal_stream(
        pool,
        format!("SELECT {JOB_COLUMNS} FROM jobmatch.jobs WHERE status = 'active' ORDER BY id"),
        batch,
        job_from_row,
    )
}
