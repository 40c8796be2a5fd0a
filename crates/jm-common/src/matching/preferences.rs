use crate::{Candidate, JobPosting};
use crate::normalize::labels_match;

const NEUTRAL: u32 = 50;

/// Zero is how an unset salary reaches us from most profile forms. Negative
/// or non-finite amounts are treated the same way.
fn salary(value: Option<f64>) -> Option<f64> {
    value.filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn salary_part(candidate: &Candidate, job: &JobPosting) -> u32 {
    let (min, max) = match (salary(job.min_salary), salary(job.max_salary)) {
        (None, None) => return NEUTRAL,
        (Some(min), None) => (min, min),
        (None, Some(max)) => (max, max),
        (Some(min), Some(max)) => (min, max),
    };

    match salary(candidate.preferred_salary) {
        None => NEUTRAL,
        Some(wanted) if wanted < min => 100,
        Some(wanted) if wanted > max => 0,
        Some(_) => 90,
    }
}

fn industry_part(candidate: &Candidate, job: &JobPosting) -> u32 {
    if labels_match(candidate.preferred_industry.as_deref(), job.industry.as_deref()) {
        100
    } else {
        NEUTRAL
    }
}

fn remote_part(candidate: &Candidate, job: &JobPosting) -> u32 {
    if !job.remote_option {
        return NEUTRAL;
    }
    match candidate.accepts_remote {
        Some(true) => 100,
        Some(false) => 0,
        None => 70,
    }
}

/// Rounded mean of the salary, industry and remote parts.
pub fn preference_score(candidate: &Candidate, job: &JobPosting) -> u8 {
    let sum = salary_part(candidate, job) + industry_part(candidate, job) + remote_part(candidate, job);
    // round(sum / 3), halves up
    ((sum * 2 + 3) / 6) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobPosting {
        JobPosting::default()
    }

    #[test]
    fn no_information_is_neutral() {
        assert_eq!(preference_score(&Candidate::default(), &job()), 50);
    }

    #[test]
    fn salary_relative_to_range() {
        let job = JobPosting {
            min_salary: Some(30_000.0),
            max_salary: Some(40_000.0),
            ..job()
        };
        let with_salary = |amount| Candidate {
            preferred_salary: Some(amount),
            ..Candidate::default()
        };

        assert_eq!(salary_part(&with_salary(25_000.0), &job), 100);
        assert_eq!(salary_part(&with_salary(35_000.0), &job), 90);
        assert_eq!(salary_part(&with_salary(40_000.0), &job), 90);
        assert_eq!(salary_part(&with_salary(45_000.0), &job), 0);
        assert_eq!(salary_part(&Candidate::default(), &job), 50);
        assert_eq!(salary_part(&with_salary(0.0), &job), 50);
    }

    #[test]
    fn unusable_salaries_are_unset() {
        let job = JobPosting {
            min_salary: Some(-1.0),
            max_salary: Some(40_000.0),
            ..job()
        };
        let with_salary = |amount| Candidate {
            preferred_salary: Some(amount),
            ..Candidate::default()
        };

        // The negative minimum is dropped, so 40k stands for both bounds.
        assert_eq!(salary_part(&with_salary(39_000.0), &job), 100);
        assert_eq!(salary_part(&with_salary(f64::NAN), &job), 50);
        assert_eq!(salary_part(&with_salary(-5.0), &job), 50);

        let broken = JobPosting {
            min_salary: Some(f64::NEG_INFINITY),
            max_salary: Some(-10.0),
            ..self::job()
        };
        assert_eq!(salary_part(&with_salary(39_000.0), &broken), 50);
    }

    #[test]
    fn single_salary_bound_stands_for_both() {
        let job = JobPosting {
            max_salary: Some(40_000.0),
            ..job()
        };
        let candidate = Candidate {
            preferred_salary: Some(39_000.0),
            ..Candidate::default()
        };
        assert_eq!(salary_part(&candidate, &job), 100);
    }

    #[test]
    fn industry_match_is_case_insensitive() {
        let job = JobPosting {
            industry: Some("Retail".into()),
            ..job()
        };
        let candidate = Candidate {
            preferred_industry: Some("retail".into()),
            ..Candidate::default()
        };
        assert_eq!(industry_part(&candidate, &job), 100);
        assert_eq!(industry_part(&Candidate::default(), &job), 50);
    }

    #[test]
    fn remote_preference_only_counts_for_remote_jobs() {
        let remote_job = JobPosting {
            remote_option: true,
            ..job()
        };
        let accepts = |value| Candidate {
            accepts_remote: value,
            ..Candidate::default()
        };

        assert_eq!(remote_part(&accepts(Some(true)), &remote_job), 100);
        assert_eq!(remote_part(&accepts(Some(false)), &remote_job), 0);
        assert_eq!(remote_part(&accepts(None), &remote_job), 70);
        assert_eq!(remote_part(&accepts(Some(false)), &job()), 50);
    }

    #[test]
    fn composite_rounds_the_mean() {
        let remote_job = JobPosting {
            remote_option: true,
            ..job()
        };
        // (50 + 50 + 70) / 3 = 56.67
        assert_eq!(preference_score(&Candidate::default(), &remote_job), 57);
    }
}
