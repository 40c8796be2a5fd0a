use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    availability::availability_score,
    experience::experience_score,
    location::location_score,
    preferences::preference_score,
    skills::skill_score,
    weights::{ConfigError, Weights},
};
use crate::date::effective_experience_years;
use crate::{Candidate, JobPosting};

const PPM: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: u8,
    pub experience: u8,
    pub location: u8,
    pub availability: u8,
    pub preferences: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub total: u8,
    pub breakdown: ScoreBreakdown,
}

/// A pair whose scoring blew up. Bad field values never get here: each
/// scorer falls back to its neutral value instead. Batch passes skip the
/// pair; single pair scoring surfaces it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("scorer panicked: {0}")]
    Panicked(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs `scoring`, turning a panic into a per-pair error so one record
/// cannot take down a whole pass.
fn guarded<T>(scoring: impl FnOnce() -> T) -> Result<T, ScoringError> {
    panic::catch_unwind(AssertUnwindSafe(scoring))
        .map_err(|payload| ScoringError::Panicked(panic_message(payload.as_ref())))
}

/// Weighted sum of the five sub-scores.
///
/// Weights are held as integer parts-per-million so the total is computed
/// without float drift: 57.5 is exactly 57.5 and rounds up to 58.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    skills: u64,
    experience: u64,
    location: u64,
    availability: u64,
    preferences: u64,
}

impl ScoreAggregator {
    pub fn new(weights: Weights) -> Result<Self, ConfigError> {
        weights.validate()?;
        let ppm = |weight: f64| (weight * PPM as f64).round() as u64;
        Ok(Self {
            skills: ppm(weights.skills),
            experience: ppm(weights.experience),
            location: ppm(weights.location),
            availability: ppm(weights.availability),
            preferences: ppm(weights.preferences),
        })
    }

    pub fn total(&self, breakdown: &ScoreBreakdown) -> u8 {
        let weighted = u64::from(breakdown.skills) * self.skills
            + u64::from(breakdown.experience) * self.experience
            + u64::from(breakdown.location) * self.location
            + u64::from(breakdown.availability) * self.availability
            + u64::from(breakdown.preferences) * self.preferences;

        ((weighted + PPM / 2) / PPM).min(100) as u8
    }

    pub fn combine(&self, breakdown: ScoreBreakdown) -> MatchScore {
        MatchScore {
            total: self.total(&breakdown),
            breakdown,
        }
    }
}

/// Runs the five scorers and the aggregator over one pair. Does not apply the
/// hard filter.
#[derive(Debug, Clone, Copy)]
pub struct PairScorer {
    aggregator: ScoreAggregator,
    reference_date: Option<NaiveDate>,
}

impl PairScorer {
    pub fn new(weights: Weights) -> Result<Self, ConfigError> {
        Ok(Self {
            aggregator: ScoreAggregator::new(weights)?,
            reference_date: None,
        })
    }

    /// Pins "today" for open-ended experience entries.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.reference_date = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn score(&self, job: &JobPosting, candidate: &Candidate) -> Result<MatchScore, ScoringError> {
        let today = self.today();
        let breakdown = guarded(|| {
            let years = effective_experience_years(candidate, today);
            ScoreBreakdown {
                skills: skill_score(&candidate.skills, &job.skills_required),
                experience: experience_score(years, job.experience_tier),
                location: location_score(candidate.location, job.location, job.remote_option),
                availability: availability_score(&candidate.availability, &job.availability),
                preferences: preference_score(candidate, job),
            }
        })?;

        Ok(self.aggregator.combine(breakdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::weights::DEFAULT_WEIGHTS;
    use crate::{AvailabilitySlot, ExperienceTier, GeoPoint};

    fn scorer() -> PairScorer {
        PairScorer::new(DEFAULT_WEIGHTS)
            .unwrap()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn reference_job() -> JobPosting {
        JobPosting {
            skills_required: vec!["excel".into(), "sales".into()],
            experience_tier: ExperienceTier::Mid,
            location: Some(GeoPoint::new(77.0, 28.0)),
            availability: vec![
                AvailabilitySlot::new("Monday", "09:00", "13:00"),
                AvailabilitySlot::new("Tuesday", "09:00", "13:00"),
            ],
            ..JobPosting::default()
        }
    }

    fn reference_candidate() -> Candidate {
        Candidate {
            skills: vec!["excel".into()],
            total_experience_years: Some(1.0),
            location: Some(GeoPoint::new(77.0, 28.036)),
            availability: vec![AvailabilitySlot::new("Monday", "12:00", "15:00")],
            profile_completed: true,
            ..Candidate::default()
        }
    }

    #[test]
    fn reference_pair_scores_fifty_eight() {
        let score = scorer().score(&reference_job(), &reference_candidate()).unwrap();
        assert_eq!(
            score.breakdown,
            ScoreBreakdown {
                skills: 50,
                experience: 50,
                location: 100,
                availability: 50,
                preferences: 50,
            }
        );
        assert_eq!(score.total, 58);
    }

    #[test]
    fn aggregator_bounds_and_determinism() {
        let aggregator = ScoreAggregator::new(DEFAULT_WEIGHTS).unwrap();
        let full = ScoreBreakdown {
            skills: 100,
            experience: 100,
            location: 100,
            availability: 100,
            preferences: 100,
        };
        assert_eq!(aggregator.total(&full), 100);
        assert_eq!(aggregator.total(&ScoreBreakdown::default()), 0);

        let mixed = ScoreBreakdown {
            skills: 33,
            experience: 71,
            location: 12,
            availability: 67,
            preferences: 57,
        };
        let first = aggregator.total(&mixed);
        assert_eq!(first, aggregator.total(&mixed));
        // 13.2 + 14.2 + 1.8 + 10.05 + 5.7 = 44.95
        assert_eq!(first, 45);
    }

    #[test]
    fn aggregator_rejects_invalid_weights() {
        let weights = Weights {
            skills: 0.9,
            ..DEFAULT_WEIGHTS
        };
        assert!(ScoreAggregator::new(weights).is_err());
    }

    #[test]
    fn out_of_range_coordinates_score_as_missing() {
        let candidate = Candidate {
            location: Some(GeoPoint::new(200.0, 28.0)),
            ..reference_candidate()
        };
        let score = scorer().score(&reference_job(), &candidate).unwrap();
        assert_eq!(score.breakdown.location, 50);

        let job = JobPosting {
            location: Some(GeoPoint::new(77.0, f64::NAN)),
            ..reference_job()
        };
        let score = scorer().score(&job, &reference_candidate()).unwrap();
        assert_eq!(score.breakdown.location, 50);
    }

    #[test]
    fn negative_salary_is_treated_as_unset() {
        let job = JobPosting {
            min_salary: Some(-1.0),
            max_salary: Some(f64::INFINITY),
            ..reference_job()
        };
        let candidate = Candidate {
            preferred_salary: Some(30_000.0),
            ..reference_candidate()
        };
        let score = scorer().score(&job, &candidate).unwrap();
        assert_eq!(score.breakdown.preferences, 50);
        assert_eq!(score.total, 58);
    }

    #[test]
    fn negative_experience_total_falls_back_to_history() {
        let candidate = Candidate {
            total_experience_years: Some(-3.0),
            experience: vec![crate::ExperienceEntry {
                start_date: Some("2020-06".into()),
                end_date: None,
                ..Default::default()
            }],
            ..reference_candidate()
        };
        let score = scorer().score(&reference_job(), &candidate).unwrap();
        assert_eq!(score.breakdown.experience, 100);
    }

    #[test]
    fn panics_become_scoring_errors() {
        let err = guarded(|| -> u8 { panic!("bad slot table") }).unwrap_err();
        assert_eq!(err, ScoringError::Panicked("bad slot table".into()));

        let owned = guarded(|| -> u8 { panic!("{} rows", 3) }).unwrap_err();
        assert_eq!(owned, ScoringError::Panicked("3 rows".into()));

        assert_eq!(guarded(|| 7u8), Ok(7));
    }

    #[test]
    fn derives_years_when_not_precomputed() {
        let candidate = Candidate {
            total_experience_years: None,
            experience: vec![crate::ExperienceEntry {
                start_date: Some("2020-06".into()),
                end_date: None,
                ..Default::default()
            }],
            ..reference_candidate()
        };
        let score = scorer().score(&reference_job(), &candidate).unwrap();
        assert_eq!(score.breakdown.experience, 100);
    }
}
