use crate::normalize::{normalize_label, normalize_skill_set};

use super::ratio_percent;

/// Share of the job's required skills the candidate holds, 0..=100.
///
/// Every entry of `required` counts, duplicates included, so the score moves
/// exactly as the posting reads.
pub fn skill_score(candidate_skills: &[String], required: &[String]) -> u8 {
    if required.is_empty() {
        return 100;
    }
    if candidate_skills.is_empty() {
        return 0;
    }

    let held = normalize_skill_set(candidate_skills);
    let matched = required
        .iter()
        .filter(|skill| held.contains(&normalize_label(skill)))
        .count();

    ratio_percent(matched, required.len())
}

/// Any overlap at all between the two lists.
pub fn shares_any_skill(candidate_skills: &[String], required: &[String]) -> bool {
    let held = normalize_skill_set(candidate_skills);
    required
        .iter()
        .any(|skill| held.contains(&normalize_label(skill)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_requirements_scores_full() {
        assert_eq!(skill_score(&[], &[]), 100);
        assert_eq!(skill_score(&skills(&["rust"]), &[]), 100);
    }

    #[test]
    fn candidate_without_skills_scores_zero() {
        assert_eq!(skill_score(&[], &skills(&["excel"])), 0);
    }

    #[test]
    fn matches_ignore_case_and_padding() {
        let held = skills(&[" Excel", "SALES "]);
        assert_eq!(skill_score(&held, &skills(&["excel", "sales"])), 100);
        assert_eq!(skill_score(&held, &skills(&["excel", "crm", "sql"])), 33);
    }

    #[test]
    fn duplicate_requirements_count_each_time() {
        let held = skills(&["excel"]);
        assert_eq!(skill_score(&held, &skills(&["excel", "Excel", "sales"])), 67);
    }

    #[test]
    fn overlap_check() {
        assert!(shares_any_skill(&skills(&["Forklift"]), &skills(&["forklift", "crm"])));
        assert!(!shares_any_skill(&skills(&["welding"]), &skills(&["crm"])));
        assert!(!shares_any_skill(&[], &skills(&["crm"])));
    }
}
