use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, info, warn, Instrument};

use super::cache::{CandidateMatch, JobMatch, MatchCache};
use super::filter::HardFilter;
use super::scoring::{MatchScore, PairScorer, ScoringError};
use super::top_k::{Ranked, TopK};
use super::weights::MatchingConfig;
use crate::error::MatchError;
use crate::run_id;
use crate::store::{MatchStore, PopulationSource, PopulationStream};
use crate::{Candidate, CandidateId, JobId, JobPosting, JobStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankOptions {
    /// Entries to return; the configured default when `None`.
    pub limit: Option<usize>,
    /// Serve the last persisted ranking instead of recomputing.
    pub cache_only: bool,
}

impl RankOptions {
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            cache_only: false,
        }
    }

    pub fn cached(mut self) -> Self {
        self.cache_only = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    CandidatesForJob,
    JobsForJobseeker,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::CandidatesForJob => "candidates_for_job",
            Direction::JobsForJobseeker => "jobs_for_jobseeker",
        }
    }
}

enum Verdict {
    Pruned(&'static str),
    Scored(MatchScore),
    Failed(ScoringError),
}

#[derive(Debug, Default)]
struct ScanTally {
    scanned: u64,
    filtered: u64,
    skipped: u64,
    below_threshold: u64,
    kept: u64,
}

impl ScanTally {
    fn publish(&self, direction: Direction) {
        let direction = direction.label();
        for (outcome, value) in [
            ("scanned", self.scanned),
            ("filtered", self.filtered),
            ("skipped", self.skipped),
            ("below_threshold", self.below_threshold),
            ("kept", self.kept),
        ] {
            metrics::counter!("jm_rank_pairs_total", "direction" => direction, "outcome" => outcome)
                .increment(value);
        }
    }
}

/// Population scan, filter, score, keep the best, persist.
///
/// Memory is bounded by `cache_limit`: survivors go through a [`TopK`] as the
/// population streams by, so nothing proportional to the population is held.
pub struct RankingEngine {
    population: Arc<dyn PopulationSource>,
    cache: MatchCache,
    filter: HardFilter,
    scorer: PairScorer,
    config: MatchingConfig,
}

impl RankingEngine {
    pub fn new(
        population: Arc<dyn PopulationSource>,
        store: Arc<dyn MatchStore>,
        config: MatchingConfig,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            population,
            cache: MatchCache::new(store, config.cache_limit),
            filter: HardFilter::new(),
            scorer: PairScorer::new(config.weights)?,
            config,
        })
    }

    /// Replaces the pair scorer, e.g. one pinned to a fixed date.
    pub fn with_scorer(mut self, scorer: PairScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    fn effective_limit(&self, options: &RankOptions) -> usize {
        options.limit.unwrap_or(self.config.default_limit)
    }

    /// Best completed candidates for `job_id`, score descending then id
    /// ascending. The full top `cache_limit` is persisted; the first `limit`
    /// are returned.
    pub async fn rank_candidates_for_job(
        &self,
        job_id: JobId,
        options: RankOptions,
    ) -> Result<Vec<CandidateMatch>, MatchError> {
        let limit = self.effective_limit(&options);

        if options.cache_only {
            if let Some(record) = self.cache.get_job_matches(job_id).await? {
                debug!(%job_id, "serving cached candidate ranking");
                return Ok(record.matches.into_iter().take(limit).collect());
            }
        }

        let run_id = run_id::generate();
        let span = tracing::info_span!(
            "rank_candidates",
            %job_id,
            %run_id,
            process_run_id = run_id::process()
        );

        async move {
            let job = self
                .population
                .job(job_id)
                .await?
                .ok_or_else(|| MatchError::not_found(JobId::KIND, job_id.0))?;

            let population = self.population.completed_candidates();
            let ranked = self
                .bounded(self.collect_top(
                    Direction::CandidatesForJob,
                    population,
                    |candidate: &Candidate| candidate.id,
                    |candidate: &Candidate| self.judge(&job, candidate),
                ))
                .await?;

            let matches = ranked
                .into_iter()
                .map(|Ranked { score, id, .. }| CandidateMatch {
                    candidate_id: id,
                    score,
                })
                .collect();

            let record = self.cache.upsert_job_matches(job_id, matches).await?;
            info!(kept = record.matches.len(), "candidate ranking refreshed");
            Ok(record.matches.into_iter().take(limit).collect())
        }
        .instrument(span)
        .await
    }

    /// Best active jobs for `jobseeker_id`, score descending then id
    /// ascending, each with a snapshot of the job.
    pub async fn rank_jobs_for_jobseeker(
        &self,
        jobseeker_id: CandidateId,
        options: RankOptions,
    ) -> Result<Vec<JobMatch>, MatchError> {
        let limit = self.effective_limit(&options);

        if options.cache_only {
            if let Some(record) = self.cache.get_jobseeker_matches(jobseeker_id).await? {
                debug!(%jobseeker_id, "serving cached job ranking");
                return Ok(record.matches.into_iter().take(limit).collect());
            }
        }

        let run_id = run_id::generate();
        let span = tracing::info_span!(
            "rank_jobs",
            %jobseeker_id,
            %run_id,
            process_run_id = run_id::process()
        );

        async move {
            let candidate = self
                .population
                .candidate(jobseeker_id)
                .await?
                .ok_or_else(|| MatchError::not_found(CandidateId::KIND, jobseeker_id.0))?;

            let population = self.population.active_jobs();
            let ranked = self
                .bounded(self.collect_top(
                    Direction::JobsForJobseeker,
                    population,
                    |job: &JobPosting| job.id,
                    |job: &JobPosting| {
                        if job.status != JobStatus::Active {
                            return Verdict::Pruned("inactive_job");
                        }
                        self.judge(job, &candidate)
                    },
                ))
                .await?;

            let matches = ranked
                .into_iter()
                .map(|Ranked { score, id, item }| JobMatch {
                    job_id: id,
                    score,
                    job: item,
                })
                .collect();

            let record = self
                .cache
                .upsert_jobseeker_matches(jobseeker_id, matches)
                .await?;
            info!(kept = record.matches.len(), "job ranking refreshed");
            Ok(record.matches.into_iter().take(limit).collect())
        }
        .instrument(span)
        .await
    }

    fn judge(&self, job: &JobPosting, candidate: &Candidate) -> Verdict {
        let outcome = self.filter.evaluate(job, candidate);
        if !outcome.is_eligible() {
            return Verdict::Pruned(outcome.into());
        }
        match self.scorer.score(job, candidate) {
            Ok(score) => Verdict::Scored(score),
            Err(err) => Verdict::Failed(err),
        }
    }

    async fn bounded<T>(
        &self,
        scan: impl Future<Output = Result<T, MatchError>>,
    ) -> Result<T, MatchError> {
        match self.config.scan_timeout {
            Some(limit) => run_with_deadline(limit, scan).await,
            None => scan.await,
        }
    }

    async fn collect_top<T, I>(
        &self,
        direction: Direction,
        mut population: PopulationStream<'_, T>,
        id_of: impl Fn(&T) -> I,
        judge: impl Fn(&T) -> Verdict,
    ) -> Result<Vec<Ranked<I, T>>, MatchError>
    where
        I: Ord + Copy + Display,
    {
        let mut tally = ScanTally::default();
        let mut top = TopK::new(self.config.cache_limit);

        while let Some(next) = population.next().await {
            let record = match next {
                Ok(record) => record,
                Err(err) if err.is_per_record() => {
                    tally.skipped += 1;
                    warn!(error = %err, "skipping malformed record");
                    continue;
                }
                Err(err) => {
                    tally.publish(direction);
                    return Err(err.into());
                }
            };

            tally.scanned += 1;
            let id = id_of(&record);
            match judge(&record) {
                Verdict::Pruned(reason) => {
                    tally.filtered += 1;
                    debug!(%id, reason, "pair pruned");
                }
                Verdict::Failed(err) => {
                    tally.skipped += 1;
                    warn!(%id, error = %err, "skipping unscorable pair");
                }
                Verdict::Scored(score) if score.total < self.config.min_match_score => {
                    tally.below_threshold += 1;
                }
                Verdict::Scored(score) => {
                    tally.kept += 1;
                    top.offer(score.total, id, record);
                }
            }
        }

        debug!(?tally, direction = direction.label(), "scan finished");
        tally.publish(direction);
        Ok(top.into_sorted_vec())
    }
}

async fn run_with_deadline<T>(
    limit: Duration,
    scan: impl Future<Output = Result<T, MatchError>>,
) -> Result<T, MatchError> {
    match tokio::time::timeout(limit, scan).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?limit, "ranking scan timed out");
            metrics::counter!("jm_rank_timeouts_total").increment(1);
            Err(MatchError::Timeout(limit))
        }
    }
}
