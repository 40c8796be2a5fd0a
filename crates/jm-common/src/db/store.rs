use async_trait::async_trait;
use futures::StreamExt;

use crate::db::{self, PgPool, DEFAULT_FETCH_BATCH};
use crate::error::StoreError;
use crate::matching::cache::{JobMatchRecord, JobseekerMatchRecord};
use crate::store::{ApplicationStore, MatchStore, PopulationSource, PopulationStream};
use crate::{Application, ApplicationId, Candidate, CandidateId, JobId, JobPosting};

/// Postgres-backed implementation of every storage trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    fetch_batch: i32,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            fetch_batch: DEFAULT_FETCH_BATCH,
        }
    }

    /// Rows per round trip when streaming populations.
    pub fn with_fetch_batch(mut self, fetch_batch: i32) -> Self {
        self.fetch_batch = fetch_batch.max(1);
        self
    }
}

#[async_trait]
impl PopulationSource for PgStore {
    async fn job(&self, id: JobId) -> Result<Option<JobPosting>, StoreError> {
        db::fetch_job(&self.pool, id).await
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        db::fetch_candidate(&self.pool, id).await
    }

    fn completed_candidates(&self) -> PopulationStream<'_, Candidate> {
        db::stream_completed_candidates(self.pool.clone(), self.fetch_batch).boxed()
    }

    fn active_jobs(&self) -> PopulationStream<'_, JobPosting> {
        db::stream_active_jobs(self.pool.clone(), self.fetch_batch).boxed()
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn put_job_matches(&self, record: &JobMatchRecord) -> Result<(), StoreError> {
        db::upsert_job_matches(&self.pool, record).await
    }

    async fn get_job_matches(&self, job_id: JobId) -> Result<Option<JobMatchRecord>, StoreError> {
        db::fetch_job_matches(&self.pool, job_id).await
    }

    async fn delete_job_matches(&self, job_id: JobId) -> Result<bool, StoreError> {
        db::delete_job_matches(&self.pool, job_id).await
    }

    async fn put_jobseeker_matches(&self, record: &JobseekerMatchRecord) -> Result<(), StoreError> {
        db::upsert_jobseeker_matches(&self.pool, record).await
    }

    async fn get_jobseeker_matches(
        &self,
        jobseeker_id: CandidateId,
    ) -> Result<Option<JobseekerMatchRecord>, StoreError> {
        db::fetch_jobseeker_matches(&self.pool, jobseeker_id).await
    }

    async fn delete_jobseeker_matches(&self, jobseeker_id: CandidateId) -> Result<bool, StoreError> {
        db::delete_jobseeker_matches(&self.pool, jobseeker_id).await
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        db::fetch_application(&self.pool, id).await
    }

    async fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError> {
        db::fetch_applications_for_job(&self.pool, job_id).await
    }

    async fn save_match_score(&self, id: ApplicationId, score: u8) -> Result<bool, StoreError> {
        db::update_match_score(&self.pool, id, score).await
    }
}
