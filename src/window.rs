//! Today's expected publish window and the on-time classification law.
//!
//! The window is recomputed for every run from the current instant in the
//! configured timezone:
//!
//! ```text
//! window_start = expected - tolerance
//! window_end   = expected + tolerance
//! ```
//!
//! A post is on time when it was published on today's calendar date and not
//! before `window_start`. Posts after `window_end` still count; the end is
//! reported for information only.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Source of "now". The checker asks for the time when it classifies.
pub trait Clock {
    fn now(&self, tz: &Tz) -> DateTime<Tz>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, tz: &Tz) -> DateTime<Tz> {
        Utc::now().with_timezone(tz)
    }
}

/// Expected publish instant and its tolerance band for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub today: NaiveDate,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub expected: DateTime<Tz>,
}

impl TimeWindow {
    /// Build the window for the calendar date of `now`.
    pub fn compute(now: &DateTime<Tz>, hour: u32, minute: u32, tolerance_minutes: u32) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let time = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or_default();
        let naive = today.and_time(time);
        let expected = localize(&tz, &naive).unwrap_or_else(|| tz.from_utc_datetime(&naive));
        let tolerance = Duration::minutes(i64::from(tolerance_minutes));

        Self {
            today,
            start: expected - tolerance,
            end: expected + tolerance,
            expected,
        }
    }

    /// Same calendar day as the window and at or after its start.
    pub fn is_on_time(&self, published_at: &DateTime<Tz>) -> bool {
        let local = published_at.with_timezone(&self.expected.timezone());
        local.date_naive() == self.today && local >= self.start
    }
}

/// Resolve a wall-clock time in `tz`.
///
/// Ambiguous times (DST fold) take the earlier instant. Times inside a DST
/// gap move forward to the first minute that exists.
pub fn localize(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=180).find_map(|shift| {
        tz.from_local_datetime(&(*naive + Duration::minutes(shift)))
            .earliest()
    })
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self, tz: &Tz) -> DateTime<Tz> {
        self.0.with_timezone(tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn test_window_bounds_surround_expected() {
        let now = Berlin.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap();
        for tolerance in [0, 30, 240, 600] {
            let w = TimeWindow::compute(&now, 18, 0, tolerance);
            assert_eq!(w.expected - w.start, Duration::minutes(tolerance as i64));
            assert_eq!(w.end - w.expected, Duration::minutes(tolerance as i64));
            assert!(w.start <= w.expected && w.expected <= w.end);
        }
    }

    #[test]
    fn test_window_uses_calendar_date_of_now() {
        let now = Berlin.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        let w = TimeWindow::compute(&now, 18, 30, 240);
        assert_eq!(w.today, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(w.expected, Berlin.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap());
        assert_eq!(w.start, Berlin.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap());
        assert_eq!(w.end, Berlin.with_ymd_and_hms(2024, 5, 1, 22, 30, 0).unwrap());
    }

    #[test]
    fn test_expected_time_inside_dst_gap_moves_forward() {
        // 2024-03-31 02:00-03:00 does not exist in Berlin
        let now = Berlin.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let w = TimeWindow::compute(&now, 2, 30, 0);
        assert_eq!(w.expected.hour(), 3);
        assert_eq!(w.expected.minute(), 0);
    }

    #[test]
    fn test_classification_law() {
        let now = Berlin.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        let w = TimeWindow::compute(&now, 18, 0, 240);

        let at_start = Berlin.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
        let before_start = Berlin.with_ymd_and_hms(2024, 5, 1, 13, 59, 0).unwrap();
        let after_end = Berlin.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
        let yesterday = Berlin.with_ymd_and_hms(2024, 4, 30, 18, 0, 0).unwrap();

        assert!(w.is_on_time(&at_start));
        assert!(!w.is_on_time(&before_start));
        assert!(w.is_on_time(&after_end));
        assert!(!w.is_on_time(&yesterday));
    }

    #[test]
    fn test_classification_converts_foreign_offsets() {
        let now = Berlin.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        let w = TimeWindow::compute(&now, 18, 0, 240);
        // 22:30 UTC on April 30th is 00:30 on May 1st in Berlin, but before the window
        let utc = Utc.with_ymd_and_hms(2024, 4, 30, 22, 30, 0).unwrap().with_timezone(&Berlin);
        assert!(!w.is_on_time(&utc));
        // 16:00 UTC is 18:00 in Berlin
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap().with_timezone(&Berlin);
        assert!(w.is_on_time(&utc));
    }

    #[test]
    fn test_fixed_clock_reports_in_requested_zone() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap());
        let now = clock.now(&Berlin);
        assert_eq!(now.hour(), 18);
    }
}
