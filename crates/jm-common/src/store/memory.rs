use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::{ApplicationStore, MatchStore, PopulationSource, PopulationStream};
use crate::error::StoreError;
use crate::matching::cache::{JobMatchRecord, JobseekerMatchRecord};
use crate::{Application, ApplicationId, Candidate, CandidateId, JobId, JobPosting, JobStatus};

#[derive(Default)]
struct Tables {
    jobs: BTreeMap<JobId, JobPosting>,
    candidates: BTreeMap<CandidateId, Candidate>,
    applications: BTreeMap<ApplicationId, Application>,
    job_matches: HashMap<JobId, JobMatchRecord>,
    jobseeker_matches: HashMap<CandidateId, JobseekerMatchRecord>,
}

/// Process-local store implementing every storage trait. Populations are
/// walked by key, one record per poll, so a scan never clones the table.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".into())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| poisoned())
    }

    pub fn insert_job(&self, job: JobPosting) -> Result<(), StoreError> {
        self.write()?.jobs.insert(job.id, job);
        Ok(())
    }

    pub fn insert_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        self.write()?.candidates.insert(candidate.id, candidate);
        Ok(())
    }

    pub fn insert_application(&self, application: Application) -> Result<(), StoreError> {
        self.write()?.applications.insert(application.id, application);
        Ok(())
    }

    pub fn job_match_keys(&self) -> Result<Vec<JobId>, StoreError> {
        let mut keys: Vec<_> = self.read()?.job_matches.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }

    /// Walks `table` in key order starting after the last key yielded. Each
    /// step re-acquires the lock, so writers are never blocked for a whole scan.
    fn walk<'a, K, T>(
        &'a self,
        table: fn(&Tables) -> &BTreeMap<K, T>,
        keep: fn(&T) -> bool,
    ) -> PopulationStream<'a, T>
    where
        K: Ord + Copy + Send + Sync + 'a,
        T: Clone + Send + Sync + 'a,
    {
        stream::unfold(Some(Bound::Unbounded), move |cursor| async move {
            let lower = cursor?;
            let tables = match self.read() {
                Ok(tables) => tables,
                Err(err) => return Some((Err(err), None)),
            };

            let next = table(&tables)
                .range((lower, Bound::Unbounded))
                .find(|(_, record)| keep(record))
                .map(|(key, record)| (*key, record.clone()));
            drop(tables);

            next.map(|(key, record)| (Ok(record), Some(Bound::Excluded(key))))
        })
        .boxed()
    }
}

#[async_trait]
impl PopulationSource for MemoryStore {
    async fn job(&self, id: JobId) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.read()?.jobs.get(&id).cloned())
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        Ok(self.read()?.candidates.get(&id).cloned())
    }

    fn completed_candidates(&self) -> PopulationStream<'_, Candidate> {
        self.walk(|tables| &tables.candidates, |candidate| candidate.profile_completed)
    }

    fn active_jobs(&self) -> PopulationStream<'_, JobPosting> {
        self.walk(|tables| &tables.jobs, |job| job.status == JobStatus::Active)
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn put_job_matches(&self, record: &JobMatchRecord) -> Result<(), StoreError> {
        self.write()?.job_matches.insert(record.key, record.clone());
        Ok(())
    }

    async fn get_job_matches(&self, job_id: JobId) -> Result<Option<JobMatchRecord>, StoreError> {
        Ok(self.read()?.job_matches.get(&job_id).cloned())
    }

    async fn delete_job_matches(&self, job_id: JobId) -> Result<bool, StoreError> {
        Ok(self.write()?.job_matches.remove(&job_id).is_some())
    }

    async fn put_jobseeker_matches(&self, record: &JobseekerMatchRecord) -> Result<(), StoreError> {
        self.write()?.jobseeker_matches.insert(record.key, record.clone());
        Ok(())
    }

    async fn get_jobseeker_matches(
        &self,
        jobseeker_id: CandidateId,
    ) -> Result<Option<JobseekerMatchRecord>, StoreError> {
        Ok(self.read()?.jobseeker_matches.get(&jobseeker_id).cloned())
    }

    async fn delete_jobseeker_matches(&self, jobseeker_id: CandidateId) -> Result<bool, StoreError> {
        Ok(self.write()?.jobseeker_matches.remove(&jobseeker_id).is_some())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(self.read()?.applications.get(&id).cloned())
    }

    async fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .read()?
            .applications
            .values()
            .filter(|application| application.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn save_match_score(&self, id: ApplicationId, score: u8) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables.applications.get_mut(&id) {
            Some(application) => {
                application.match_score = Some(score);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    fn candidate(id: i64, completed: bool) -> Candidate {
        Candidate {
            id: CandidateId(id),
            profile_completed: completed,
            ..Candidate::default()
        }
    }

    #[tokio::test]
    async fn streams_only_completed_candidates_in_id_order() {
        let store = MemoryStore::new();
        for (id, completed) in [(3, true), (1, true), (2, false), (5, true)] {
            store.insert_candidate(candidate(id, completed)).unwrap();
        }

        let ids: Vec<_> = store
            .completed_candidates()
            .map_ok(|candidate| candidate.id.0)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn streams_only_active_jobs() {
        let store = MemoryStore::new();
        for (id, status) in [(1, JobStatus::Closed), (2, JobStatus::Active), (3, JobStatus::Draft)] {
            store
                .insert_job(JobPosting {
                    id: JobId(id),
                    status,
                    ..JobPosting::default()
                })
                .unwrap();
        }

        let jobs: Vec<_> = store.active_jobs().try_collect().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, JobId(2));
    }

    #[tokio::test]
    async fn stream_sees_rows_inserted_ahead_of_the_cursor() {
        let store = MemoryStore::new();
        store.insert_candidate(candidate(1, true)).unwrap();

        let mut stream = store.completed_candidates();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id, CandidateId(1));

        store.insert_candidate(candidate(2, true)).unwrap();
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.id, CandidateId(2));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn saving_score_on_missing_application_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.save_match_score(ApplicationId(1), 50).await.unwrap());
    }
}
