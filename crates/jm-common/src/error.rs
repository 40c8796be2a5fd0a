use std::time::Duration;

use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;

use crate::matching::cache::{CandidateMatch, JobMatch, MatchRecord};
use crate::matching::scoring::{MatchScore, ScoringError};
use crate::matching::weights::ConfigError;
use crate::{ApplicationId, CandidateId, JobId};

/// Failures of the persistence layer, whatever backs it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    /// One row could not be turned into a domain record. Batch readers treat
    /// this as a per-record problem, not a broken stream.
    #[error("malformed {kind} {id}: {reason}")]
    Mapping {
        kind: &'static str,
        id: i64,
        reason: String,
    },
    #[error("json encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn mapping(kind: &'static str, id: i64, reason: impl Into<String>) -> Self {
        Self::Mapping {
            kind,
            id,
            reason: reason.into(),
        }
    }

    /// `true` when the error concerns one record and the rest of a scan is
    /// still trustworthy.
    pub fn is_per_record(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }
}

/// A write that failed after the value to write had been computed. Carried in
/// [`MatchError::CacheWrite`] so the caller can serve the value or retry.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    JobMatches(MatchRecord<JobId, CandidateMatch>),
    JobseekerMatches(MatchRecord<CandidateId, JobMatch>),
    ApplicationScore {
        application_id: ApplicationId,
        score: MatchScore,
    },
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("failed to score {subject}: {source}")]
    ScoringFailure {
        subject: String,
        #[source]
        source: ScoringError,
    },
    #[error("failed to persist {key}: {source}")]
    CacheWrite {
        key: String,
        pending: Box<PendingWrite>,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("scan did not finish within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MatchError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn cache_write(key: impl Into<String>, pending: PendingWrite, source: StoreError) -> Self {
        Self::CacheWrite {
            key: key.into(),
            pending: Box::new(pending),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        let err = MatchError::not_found(JobId::KIND, 7);
        assert_eq!(err.to_string(), "job 7 not found");
    }

    #[test]
    fn only_mapping_errors_are_per_record() {
        assert!(StoreError::mapping("candidate", 1, "bad slot").is_per_record());
        assert!(!StoreError::Unavailable("down".into()).is_per_record());
    }
}
