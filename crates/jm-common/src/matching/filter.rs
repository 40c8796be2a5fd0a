use strum::{AsRefStr, IntoStaticStr};

use crate::normalize::normalize_label;
use crate::{Candidate, JobPosting};

use super::skills::shares_any_skill;

/// Result of the eligibility gate. Anything other than `Eligible` names the
/// first rule that rejected the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FilterOutcome {
    Eligible,
    IncompleteProfile,
    NoSharedSkill,
    EducationMismatch,
    NoAvailability,
}

impl FilterOutcome {
    pub fn is_eligible(self) -> bool {
        self == FilterOutcome::Eligible
    }
}

/// Yes/no gate run before scoring. Distance is never a reason to reject; it
/// only feeds the location score.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardFilter;

impl HardFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, job: &JobPosting, candidate: &Candidate) -> FilterOutcome {
        if !candidate.profile_completed {
            return FilterOutcome::IncompleteProfile;
        }

        if !job.skills_required.is_empty()
            && !shares_any_skill(&candidate.skills, &job.skills_required)
        {
            return FilterOutcome::NoSharedSkill;
        }

        if let Some(required) = job.education.as_deref().map(normalize_label) {
            if !required.is_empty()
                && !candidate
                    .education
                    .iter()
                    .any(|record| record.level.to_lowercase().contains(&required))
            {
                return FilterOutcome::EducationMismatch;
            }
        }

        // Presence only: overlap is left to the availability score.
        if !job.availability.is_empty() && candidate.availability.is_empty() {
            return FilterOutcome::NoAvailability;
        }

        FilterOutcome::Eligible
    }

    pub fn is_eligible(&self, job: &JobPosting, candidate: &Candidate) -> bool {
        self.evaluate(job, candidate).is_eligible()
    }
}
