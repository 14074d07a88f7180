//! Date calculation for the weekly cadence.
//!
//! The publish target is always the next occurrence of a fixed weekday,
//! strictly after today. "Today" comes from the local time zone of whatever
//! machine runs the publish; there is no normalization, so two machines in
//! different zones can disagree near midnight.

use jiff::{
    ToSpan, Zoned,
    civil::{Date, Weekday},
};

/// The weekday the published status refers to.
pub const TARGET_WEEKDAY: Weekday = Weekday::Sunday;

/// Today's date in the process's local time zone.
#[must_use]
pub fn today() -> Date {
    Zoned::now().date()
}

/// The next occurrence of `weekday` strictly after `today`.
///
/// When `today` already falls on `weekday` the result is a full week out,
/// never `today` itself.
#[must_use]
pub fn next_occurrence(today: Date, weekday: Weekday) -> Date {
    let current = i64::from(today.weekday().to_sunday_zero_offset());
    let wanted = i64::from(weekday.to_sunday_zero_offset());
    let delta = match (wanted - current).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    today + delta.days()
}

/// "Sunday, March 8, 2026".
#[must_use]
pub fn long_form(date: Date) -> String {
    date.strftime("%A, %B %-d, %Y").to_string()
}

/// "March 8, 2026".
#[must_use]
pub fn medium_form(date: Date) -> String {
    date.strftime("%B %-d, %Y").to_string()
}

/// Branch name for a publish targeting `date`: `YYYY-MM-DD`.
#[must_use]
pub fn branch_name(date: Date) -> String {
    date.strftime("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn wednesday_rolls_forward_four_days() {
        let wednesday = date(2026, 3, 4);
        assert_eq!(wednesday.weekday(), Weekday::Wednesday);

        let sunday = next_occurrence(wednesday, Weekday::Sunday);
        assert_eq!(sunday, date(2026, 3, 8));
    }

    #[test]
    fn sunday_rolls_a_full_week() {
        let sunday = date(2026, 3, 8);
        assert_eq!(next_occurrence(sunday, Weekday::Sunday), date(2026, 3, 15));
    }

    #[test]
    fn saturday_rolls_one_day() {
        let saturday = date(2026, 3, 7);
        assert_eq!(next_occurrence(saturday, Weekday::Sunday), date(2026, 3, 8));
    }

    #[test]
    fn always_strictly_after_and_on_weekday() {
        let start = date(2025, 12, 20);
        for offset in 0..60_i64 {
            let today = start + offset.days();
            let next = next_occurrence(today, TARGET_WEEKDAY);
            assert!(next > today, "{next} not after {today}");
            assert_eq!(next.weekday(), Weekday::Sunday);
            let gap = (next - today).get_days();
            assert!((1..=7).contains(&gap), "gap {gap} from {today}");
        }
    }

    #[test]
    fn other_weekdays_work_too() {
        let wednesday = date(2026, 3, 4);
        assert_eq!(
            next_occurrence(wednesday, Weekday::Friday),
            date(2026, 3, 6)
        );
        assert_eq!(
            next_occurrence(wednesday, Weekday::Tuesday),
            date(2026, 3, 10)
        );
    }

    #[test]
    fn crosses_year_boundary() {
        let tuesday = date(2025, 12, 30);
        assert_eq!(next_occurrence(tuesday, Weekday::Sunday), date(2026, 1, 4));
    }

    #[test]
    fn formats() {
        let sunday = date(2026, 3, 8);
        assert_eq!(long_form(sunday), "Sunday, March 8, 2026");
        assert_eq!(medium_form(sunday), "March 8, 2026");
        assert_eq!(branch_name(sunday), "2026-03-08");
    }
}
