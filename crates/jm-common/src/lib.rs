pub mod date;
pub mod db;
pub mod error;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod run_id;
pub mod store;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const KIND: &'static str = $label;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Jobseeker (candidate) identity.
    CandidateId,
    "candidate"
);
entity_id!(JobId, "job");
entity_id!(ApplicationId, "application");

/// WGS84 point. Matching code always reads `(longitude, latitude)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Weekly slot, e.g. `{ day: "Monday", start_time: "09:00", end_time: "13:00" }`.
/// Times are kept as entered; parsing happens at scoring time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl AvailabilitySlot {
    pub fn new(day: impl Into<String>, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub level: String,
    #[serde(default)]
    pub institute: Option<String>,
}

/// One entry of a candidate's work history. Dates are raw strings because
/// profiles are edited by hand and may hold anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExperienceTier {
    #[default]
    Entry,
    Mid,
    Senior,
}

impl ExperienceTier {
    /// Lenient parse: anything unrecognised is treated as `Entry`.
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }

    pub fn required_years(self) -> f64 {
        match self {
            ExperienceTier::Entry => 0.0,
            ExperienceTier::Mid => 2.0,
            ExperienceTier::Senior => 5.0,
        }
    }
}

impl<'de> Deserialize<'de> for ExperienceTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
    Draft,
}

// Commonly used data models for matching functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Precomputed total; `None` or a non-positive value means "derive from history".
    #[serde(default)]
    pub total_experience_years: Option<f64>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationRecord>,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub preferred_salary: Option<f64>,
    #[serde(default)]
    pub preferred_industry: Option<String>,
    #[serde(default)]
    pub accepts_remote: Option<bool>,
    #[serde(default)]
    pub profile_completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub experience_tier: ExperienceTier,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub remote_option: bool,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub max_salary: Option<f64>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
}

/// Pairwise application record as far as matching is concerned. The lifecycle
/// (`status`) belongs to the application service and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: CandidateId,
    pub status: String,
    pub match_score: Option<u8>,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_tier_parses_leniently() {
        assert_eq!(ExperienceTier::from_label("Mid"), ExperienceTier::Mid);
        assert_eq!(ExperienceTier::from_label(" SENIOR "), ExperienceTier::Senior);
        assert_eq!(ExperienceTier::from_label("principal"), ExperienceTier::Entry);
        assert_eq!(ExperienceTier::from_label(""), ExperienceTier::Entry);
    }

    #[test]
    fn experience_tier_deserializes_unknown_labels_as_entry() {
        let tier: ExperienceTier = serde_json::from_str("\"Staff\"").unwrap();
        assert_eq!(tier, ExperienceTier::Entry);

        let tier: ExperienceTier = serde_json::from_str("\"senior\"").unwrap();
        assert_eq!(tier, ExperienceTier::Senior);
        assert_eq!(serde_json::to_string(&tier).unwrap(), "\"senior\"");
    }

    #[test]
    fn job_status_round_trips_through_text() {
        assert_eq!("Active".parse::<JobStatus>().unwrap(), JobStatus::Active);
        assert_eq!(JobStatus::Closed.as_ref(), "closed");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = CandidateId(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(id.to_string(), "42");
        assert_eq!(CandidateId::KIND, "candidate");
    }
}
