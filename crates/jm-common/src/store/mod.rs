//! Storage seams of the matching core.
//!
//! The engine only ever sees these traits. `memory` backs tests and local
//! runs; `crate::db::PgStore` backs production.

pub mod memory;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::StoreError;
use crate::matching::cache::{JobMatchRecord, JobseekerMatchRecord};
use crate::{Application, ApplicationId, Candidate, CandidateId, JobId, JobPosting};

pub use memory::MemoryStore;

/// Lazily produced population. Items are pulled one at a time; dropping the
/// stream releases whatever cursor backs it.
pub type PopulationStream<'a, T> = BoxStream<'a, Result<T, StoreError>>;

#[async_trait]
pub trait PopulationSource: Send + Sync {
    async fn job(&self, id: JobId) -> Result<Option<JobPosting>, StoreError>;

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError>;

    /// Jobseekers whose profile is marked complete, in id order.
    fn completed_candidates(&self) -> PopulationStream<'_, Candidate>;

    /// Jobs in `active` status, in id order.
    fn active_jobs(&self) -> PopulationStream<'_, JobPosting>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Insert or replace the record under `record.key`.
    async fn put_job_matches(&self, record: &JobMatchRecord) -> Result<(), StoreError>;

    async fn get_job_matches(&self, job_id: JobId) -> Result<Option<JobMatchRecord>, StoreError>;

    async fn delete_job_matches(&self, job_id: JobId) -> Result<bool, StoreError>;

    async fn put_jobseeker_matches(&self, record: &JobseekerMatchRecord) -> Result<(), StoreError>;

    async fn get_jobseeker_matches(
        &self,
        jobseeker_id: CandidateId,
    ) -> Result<Option<JobseekerMatchRecord>, StoreError>;

    async fn delete_jobseeker_matches(&self, jobseeker_id: CandidateId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError>;

    async fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError>;

    /// Overwrites the stored score. `false` when the application no longer
    /// exists.
    async fn save_match_score(&self, id: ApplicationId, score: u8) -> Result<bool, StoreError>;
}
