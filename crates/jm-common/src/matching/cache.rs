use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{MatchError, PendingWrite};
use crate::store::MatchStore;
use crate::{CandidateId, JobId, JobPosting};

/// A persisted ranking for one job or one jobseeker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord<K, T> {
    pub key: K,
    pub matches: Vec<T>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub candidate_id: CandidateId,
    pub score: u8,
}

/// Jobseeker-side entries carry the job as it looked when ranked, so reading
/// recommendations needs no join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: JobId,
    pub score: u8,
    pub job: JobPosting,
}

pub type JobMatchRecord = MatchRecord<JobId, CandidateMatch>;
pub type JobseekerMatchRecord = MatchRecord<CandidateId, JobMatch>;

/// Keyed top-N results. Writes replace the whole record; reads never
/// recompute.
#[derive(Clone)]
pub struct MatchCache {
    store: Arc<dyn MatchStore>,
    limit: usize,
}

impl MatchCache {
    pub fn new(store: Arc<dyn MatchStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    #[instrument(skip(self, matches), fields(count = matches.len()))]
    pub async fn upsert_job_matches(
        &self,
        job_id: JobId,
        mut matches: Vec<CandidateMatch>,
    ) -> Result<JobMatchRecord, MatchError> {
        matches.truncate(self.limit);
        let record = MatchRecord {
            key: job_id,
            matches,
            last_updated: Utc::now(),
        };

        match self.store.put_job_matches(&record).await {
            Ok(()) => Ok(record),
            Err(source) => Err(MatchError::cache_write(
                format!("job_matches:{job_id}"),
                PendingWrite::JobMatches(record),
                source,
            )),
        }
    }

    #[instrument(skip(self, matches), fields(count = matches.len()))]
    pub async fn upsert_jobseeker_matches(
        &self,
        jobseeker_id: CandidateId,
        mut matches: Vec<JobMatch>,
    ) -> Result<JobseekerMatchRecord, MatchError> {
        matches.truncate(self.limit);
        let record = MatchRecord {
            key: jobseeker_id,
            matches,
            last_updated: Utc::now(),
        };

        match self.store.put_jobseeker_matches(&record).await {
            Ok(()) => Ok(record),
            Err(source) => Err(MatchError::cache_write(
                format!("jobseeker_matches:{jobseeker_id}"),
                PendingWrite::JobseekerMatches(record),
                source,
            )),
        }
    }

    pub async fn get_job_matches(&self, job_id: JobId) -> Result<Option<JobMatchRecord>, MatchError> {
        Ok(self.store.get_job_matches(job_id).await?)
    }

    pub async fn get_jobseeker_matches(
        &self,
        jobseeker_id: CandidateId,
    ) -> Result<Option<JobseekerMatchRecord>, MatchError> {
        Ok(self.store.get_jobseeker_matches(jobseeker_id).await?)
    }

    /// For whoever deletes the job. Returns whether a record existed.
    pub async fn purge_job_matches(&self, job_id: JobId) -> Result<bool, MatchError> {
        Ok(self.store.delete_job_matches(job_id).await?)
    }

    pub async fn purge_jobseeker_matches(&self, jobseeker_id: CandidateId) -> Result<bool, MatchError> {
        Ok(self.store.delete_jobseeker_matches(jobseeker_id).await?)
    }
}
