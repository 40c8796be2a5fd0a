use std::time::Duration;

use thiserror::Error;

/// Weights the aggregator applies to each sub-score.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    skills: 0.40,
    experience: 0.20,
    location: 0.15,
    availability: 0.15,
    preferences: 0.10,
};

pub const DEFAULT_MIN_MATCH_SCORE: u8 = 30;
pub const DEFAULT_CACHE_LIMIT: usize = 50;
pub const DEFAULT_RESULT_LIMIT: usize = 20;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub availability: f64,
    pub preferences: f64,
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.location + self.availability + self.preferences
    }

    pub(crate) fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("skills", self.skills),
            ("experience", self.experience),
            ("location", self.location),
            ("availability", self.availability),
            ("preferences", self.preferences),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightOutOfRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weight `{name}` must be within [0, 1], got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },
    #[error("weights must sum to 1.0, got {0}")]
    WeightSum(f64),
    #[error("min_match_score must be within 0..=100, got {0}")]
    MinMatchScore(u8),
    #[error("{0} must be positive")]
    ZeroLimit(&'static str),
}

/// Everything the matching core needs at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub weights: Weights,
    /// Pairs scoring below this are dropped from rankings.
    pub min_match_score: u8,
    /// Longest list kept per cached ranking.
    pub cache_limit: usize,
    /// Result length when a caller does not ask for one.
    pub default_limit: usize,
    pub scan_timeout: Option<Duration>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
            cache_limit: DEFAULT_CACHE_LIMIT,
            default_limit: DEFAULT_RESULT_LIMIT,
            scan_timeout: None,
        }
    }
}

impl MatchingConfig {
    /// Reads `JM_*` overrides from the process environment. Unset or
    /// unparseable values keep their defaults; the result is validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        fn read<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &str,
            default: T,
        ) -> T {
            match lookup(name) {
                None => default,
                Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                    tracing::warn!(variable = name, value = %raw, "ignoring unparseable setting");
                    default
                }),
            }
        }

        let base = Self::default();
        let weights = Weights {
            skills: read(&lookup, "JM_WEIGHT_SKILLS", base.weights.skills),
            experience: read(&lookup, "JM_WEIGHT_EXPERIENCE", base.weights.experience),
            location: read(&lookup, "JM_WEIGHT_LOCATION", base.weights.location),
            availability: read(&lookup, "JM_WEIGHT_AVAILABILITY", base.weights.availability),
            preferences: read(&lookup, "JM_WEIGHT_PREFERENCES", base.weights.preferences),
        };

        let scan_timeout = read::<u64>(&lookup, "JM_SCAN_TIMEOUT_MS", 0);

        let config = Self {
            weights,
            min_match_score: read(&lookup, "JM_MIN_MATCH_SCORE", base.min_match_score),
            cache_limit: read(&lookup, "JM_CACHE_LIMIT", base.cache_limit),
            default_limit: read(&lookup, "JM_DEFAULT_LIMIT", base.default_limit),
            scan_timeout: (scan_timeout > 0).then(|| Duration::from_millis(scan_timeout)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if self.min_match_score > 100 {
            return Err(ConfigError::MinMatchScore(self.min_match_score));
        }
        if self.cache_limit == 0 {
            return Err(ConfigError::ZeroLimit("cache_limit"));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::ZeroLimit("default_limit"));
        }
        Ok(())
    }
}
