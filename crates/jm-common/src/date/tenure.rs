use chrono::{DateTime, Datelike, NaiveDate};

use crate::{Candidate, ExperienceEntry};

/// Parses the date forms profiles actually contain: RFC 3339 timestamps,
/// `YYYY-MM-DD`, and `YYYY-MM` (taken as the first of the month).
pub fn parse_profile_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok()
}

/// Calendar-month span; day-of-month is ignored.
fn whole_months(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year() - start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months
}

fn entry_months(entry: &ExperienceEntry, today: NaiveDate) -> i64 {
    let Some(start) = entry.start_date.as_deref().and_then(parse_profile_date) else {
        return 0;
    };

    // An open-ended entry runs until today. A present but unparseable end date
    // voids the entry rather than silently extending it.
    let end = match entry.end_date.as_deref() {
        None => today,
        Some(raw) if raw.trim().is_empty() => today,
        Some(raw) => match parse_profile_date(raw) {
            Some(date) => date,
            None => return 0,
        },
    };

    if end > start {
        whole_months(start, end)
    } else {
        0
    }
}

/// Total experience in years, one decimal place.
pub fn total_experience_years(entries: &[ExperienceEntry], today: NaiveDate) -> f64 {
    let months: i64 = entries.iter().map(|entry| entry_months(entry, today)).sum();
    (months as f64 / 12.0 * 10.0).round() / 10.0
}

/// Precomputed total when the profile carries a positive one, otherwise the
/// total derived from the experience history.
pub fn effective_experience_years(candidate: &Candidate, today: NaiveDate) -> f64 {
    match candidate.total_experience_years {
        Some(years) if years.is_finite() && years > 0.0 => years,
        _ => total_experience_years(&candidate.experience, today),
    }
}
