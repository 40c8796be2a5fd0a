use crate::AvailabilitySlot;

use super::ratio_percent;

/// Minutes since midnight for `H`, `HH:MM` or `H:MM`. `24:00` is accepted as
/// an end-of-day marker.
pub fn parse_minutes(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let (hours, minutes) = match raw.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None => (raw, ""),
    };

    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = match minutes.trim() {
        "" => 0,
        value => value.parse().ok()?,
    };

    if minutes >= 60 || hours > 24 || (hours == 24 && minutes > 0) {
        return None;
    }
    Some(hours * 60 + minutes)
}

fn same_day(a: &AvailabilitySlot, b: &AvailabilitySlot) -> bool {
    let a = a.day.trim();
    !a.is_empty() && a.eq_ignore_ascii_case(b.day.trim())
}

/// Same day and the half-open intervals intersect; slots that merely touch
/// (one ends when the other starts) do not overlap. Any unparseable time
/// means no overlap.
pub fn slots_overlap(a: &AvailabilitySlot, b: &AvailabilitySlot) -> bool {
    if !same_day(a, b) {
        return false;
    }

    let times = (
        parse_minutes(&a.start_time),
        parse_minutes(&a.end_time),
        parse_minutes(&b.start_time),
        parse_minutes(&b.end_time),
    );
    match times {
        (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => {
            a_start < b_end && b_start < a_end
        }
        _ => false,
    }
}

/// Share of job slots covered by at least one candidate slot.
pub fn availability_score(candidate: &[AvailabilitySlot], job: &[AvailabilitySlot]) -> u8 {
    if job.is_empty() {
        return 100;
    }
    if candidate.is_empty() {
        return 0;
    }

    let covered = job
        .iter()
        .filter(|wanted| candidate.iter().any(|offered| slots_overlap(offered, wanted)))
        .count();

    ratio_percent(covered, job.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: &str, start: &str, end: &str) -> AvailabilitySlot {
        AvailabilitySlot::new(day, start, end)
    }

    #[test]
    fn parses_common_time_forms() {
        assert_eq!(parse_minutes("09:00"), Some(540));
        assert_eq!(parse_minutes("9:30"), Some(570));
        assert_eq!(parse_minutes("13"), Some(780));
        assert_eq!(parse_minutes("24:00"), Some(1440));
        assert_eq!(parse_minutes("25:00"), None);
        assert_eq!(parse_minutes("10:75"), None);
        assert_eq!(parse_minutes("noon"), None);
        assert_eq!(parse_minutes(""), None);
    }

    #[test]
    fn overlapping_slots_on_same_day_match() {
        let job = slot("Monday", "09:00", "13:00");
        assert!(slots_overlap(&slot("Monday", "12:00", "15:00"), &job));
        assert!(slots_overlap(&slot("monday", "08:00", "10:00"), &job));
    }

    #[test]
    fn touching_slots_do_not_overlap() {
        let job = slot("Monday", "09:00", "13:00");
        assert!(!slots_overlap(&slot("Monday", "13:00", "15:00"), &job));
        assert!(!slots_overlap(&slot("Monday", "07:00", "09:00"), &job));
    }

    #[test]
    fn different_days_or_bad_times_never_match() {
        let job = slot("Monday", "09:00", "13:00");
        assert!(!slots_overlap(&slot("Tuesday", "09:00", "13:00"), &job));
        assert!(!slots_overlap(&slot("Monday", "late", "13:00"), &job));
        assert!(!slots_overlap(&slot("", "09:00", "13:00"), &slot("", "09:00", "13:00")));
    }

    #[test]
    fn scores_share_of_covered_job_slots() {
        let job = vec![slot("Monday", "09:00", "13:00"), slot("Wednesday", "09:00", "13:00")];
        let candidate = vec![slot("Monday", "10:00", "11:00")];
        assert_eq!(availability_score(&candidate, &job), 50);
        assert_eq!(availability_score(&[], &job), 0);
        assert_eq!(availability_score(&candidate, &[]), 100);
    }
}
