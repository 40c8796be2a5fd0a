use crate::ExperienceTier;

use super::clamp_score;

/// Years against the tier threshold, capped at 100. Entry-tier jobs accept
/// anyone.
pub fn experience_score(years: f64, tier: ExperienceTier) -> u8 {
    let required = tier.required_years();
    if required <= 0.0 {
        return 100;
    }
    clamp_score((years / required * 100.0).round().min(100.0))
}
