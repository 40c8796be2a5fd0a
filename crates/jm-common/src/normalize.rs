use std::collections::HashSet;

/// Canonical form used for every case-insensitive comparison in matching.
pub fn normalize_label(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Candidate-side skill lookup set.
pub fn normalize_skill_set(skills: &[String]) -> HashSet<String> {
    skills.iter().map(|skill| normalize_label(skill)).collect()
}

/// `true` when both labels are present (non-blank) and equal ignoring case
/// and surrounding whitespace.
pub fn labels_match(left: Option<&str>, right: Option<&str>) -> bool {
    let left = left.map(normalize_label).filter(|l| !l.is_empty());
    let right = right.map(normalize_label).filter(|r| !r.is_empty());
    matches!((left, right), (Some(l), Some(r)) if l == r)
}
