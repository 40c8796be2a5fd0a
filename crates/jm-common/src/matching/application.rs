use std::sync::Arc;

use tracing::{instrument, warn};

use super::scoring::{MatchScore, PairScorer};
use super::weights::Weights;
use crate::error::{MatchError, PendingWrite};
use crate::store::{ApplicationStore, PopulationSource};
use crate::{Application, ApplicationId, CandidateId, JobId};

/// On-demand score for one application, persisted onto the application so
/// later reads cost nothing. The hard filter is not applied: the candidate
/// already applied.
pub struct ApplicationScorer {
    population: Arc<dyn PopulationSource>,
    applications: Arc<dyn ApplicationStore>,
    scorer: PairScorer,
}

impl ApplicationScorer {
    pub fn new(
        population: Arc<dyn PopulationSource>,
        applications: Arc<dyn ApplicationStore>,
        weights: Weights,
    ) -> Result<Self, MatchError> {
        Ok(Self {
            population,
            applications,
            scorer: PairScorer::new(weights)?,
        })
    }

    pub fn with_scorer(mut self, scorer: PairScorer) -> Self {
        self.scorer = scorer;
        self
    }

    async fn load(&self, id: ApplicationId) -> Result<Application, MatchError> {
        self.applications
            .application(id)
            .await?
            .ok_or_else(|| MatchError::not_found(ApplicationId::KIND, id.0))
    }

    async fn compute(&self, application: &Application) -> Result<MatchScore, MatchError> {
        let job = self
            .population
            .job(application.job_id)
            .await?
            .ok_or_else(|| MatchError::not_found(JobId::KIND, application.job_id.0))?;
        let candidate = self
            .population
            .candidate(application.applicant_id)
            .await?
            .ok_or_else(|| MatchError::not_found(CandidateId::KIND, application.applicant_id.0))?;

        self.scorer
            .score(&job, &candidate)
            .map_err(|source| MatchError::ScoringFailure {
                subject: format!("application {}", application.id),
                source,
            })
    }

    async fn persist(&self, id: ApplicationId, score: MatchScore) -> Result<MatchScore, MatchError> {
        match self.applications.save_match_score(id, score.total).await {
            Ok(true) => Ok(score),
            Ok(false) => Err(MatchError::not_found(ApplicationId::KIND, id.0)),
            Err(source) => Err(MatchError::cache_write(
                format!("application:{id}"),
                PendingWrite::ApplicationScore {
                    application_id: id,
                    score,
                },
                source,
            )),
        }
    }

    /// Recomputes and overwrites the stored score.
    #[instrument(skip(self))]
    pub async fn score_application(&self, id: ApplicationId) -> Result<MatchScore, MatchError> {
        let application = self.load(id).await?;
        let score = self.compute(&application).await?;
        self.persist(id, score).await
    }

    /// Stored score when there is a non-zero one, otherwise scores now.
    #[instrument(skip(self))]
    pub async fn cached_or_score(&self, id: ApplicationId) -> Result<u8, MatchError> {
        let application = self.load(id).await?;
        if let Some(score) = stored_score(&application) {
            return Ok(score);
        }
        let score = self.compute(&application).await?;
        Ok(self.persist(id, score).await?.total)
    }

    /// Every application to `job_id` with its score, best first. Missing
    /// scores are computed and persisted on the way; an application that
    /// cannot be scored is listed without one.
    #[instrument(skip(self))]
    pub async fn applicant_scores_for_job(&self, job_id: JobId) -> Result<Vec<Application>, MatchError> {
        if self.population.job(job_id).await?.is_none() {
            return Err(MatchError::not_found(JobId::KIND, job_id.0));
        }

        let mut applications = self.applications.applications_for_job(job_id).await?;
        for application in applications.iter_mut() {
            if stored_score(application).is_some() {
                continue;
            }

            match self.compute(application).await {
                Ok(score) => {
                    let score = self.persist(application.id, score).await?;
                    application.match_score = Some(score.total);
                }
                Err(err @ (MatchError::NotFound { .. } | MatchError::ScoringFailure { .. })) => {
                    warn!(application_id = %application.id, error = %err, "leaving application unscored");
                }
                Err(err) => return Err(err),
            }
        }

        applications.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(applications)
    }
}

fn stored_score(application: &Application) -> Option<u8> {
    application.match_score.filter(|score| *score > 0)
}
