use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::CoreError;
use crate::models::{Frequency, RecurrencePattern};

/// RecurrenceSchedule: cadence arithmetic for one recurring series.
///
/// Responsibilities:
/// 1. Validate pattern structure before any date computation
/// 2. Resolve the next occurrence on or after an arbitrary point in time
/// 3. Produce bounded, ordered occurrence sequences for materialization
///    and preview
///
/// All methods are pure and synchronous: the caller supplies the pattern and
/// the reference time, nothing is read from or written to storage, and a
/// naturally exhausted series is reported as `None`, never as an error.
///
/// Occurrence arithmetic stays in UTC. The pattern's `time_zone` is a
/// rendering label; the anchor's UTC time-of-day is reproduced on every
/// occurrence as-is.
#[derive(Debug)]
pub struct RecurrenceSchedule<'a> {
    pattern: &'a RecurrencePattern,
}

impl<'a> RecurrenceSchedule<'a> {
    /// Builds a schedule over a borrowed pattern, rejecting structurally
    /// invalid input up front.
    ///
    /// # Errors
    /// * `CoreError::InvalidPattern` when the cadence fields do not line up:
    ///   weekly/biweekly without `day_of_week`, monthly without
    ///   `day_of_month`, a day field set for the wrong frequency, an
    ///   out-of-range day, a non-positive `interval`, or a non-positive
    ///   `occurrences` cap.
    pub fn new(pattern: &'a RecurrencePattern) -> Result<Self, CoreError> {
        validate_pattern(pattern)?;
        Ok(Self { pattern })
    }

    /// Resolves the next occurrence of the series on or after `from`.
    ///
    /// # Arguments
    /// * `from` - Reference point; the returned date is never before it
    ///
    /// # Returns
    /// * `Some(date)` - The structurally next occurrence, carrying the
    ///   anchor's time-of-day
    /// * `None` - The series is exhausted: the candidate falls strictly after
    ///   `end_date`, or the `occurrences` cap is already consumed by
    ///   materialized bookings
    ///
    /// # Behavior
    /// - Weekly: step `7 * interval` days from the anchor until the candidate
    ///   reaches `from`. The anchor is expected to sit on `day_of_week`, so
    ///   every stepped candidate lands on the same weekday.
    /// - Biweekly: identical stepping with a fixed 14-day period; `interval`
    ///   is not applied as a week multiplier.
    /// - Monthly: advance `interval` months at a time from the anchor's
    ///   month; each candidate uses `min(day_of_month, last day of month)`,
    ///   so a day-31 series lands on Feb 28/29 instead of skipping February.
    pub fn next_occurrence(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let pattern = self.pattern;

        if let Some(cap) = pattern.occurrences {
            if pattern.generated_count() as i64 >= cap {
                return None;
            }
        }

        let candidate = match pattern.frequency {
            Frequency::Weekly => self.step_days(7 * pattern.interval, from),
            Frequency::Biweekly => self.step_days(14, from),
            Frequency::Monthly => self.step_months(from),
        };

        match pattern.end_date {
            Some(end) if candidate > end => None,
            _ => Some(candidate),
        }
    }

    /// Produces the upcoming occurrence dates of the series, bounded and
    /// ascending.
    ///
    /// # Arguments
    /// * `max_to_generate` - Hard cap on the sequence length
    ///
    /// # Returns
    /// The anchor date followed by subsequent occurrences. Length is bounded
    /// by `max_to_generate`, by the bookings still permitted under
    /// `occurrences`, and by `end_date`. Calling twice with the same inputs
    /// yields the same sequence; no state is kept between calls.
    ///
    /// # Behavior
    /// - The anchor is the nominal first session and is emitted as-is (it is
    ///   not re-resolved against the cadence).
    /// - Each following date is resolved on or after the previous date plus
    ///   one day: the smallest advance that cannot skip a cadence of seven
    ///   days or more, and the way a stored frontier is re-entered after a
    ///   materialization run.
    pub fn occurrence_dates(&self, max_to_generate: usize) -> Vec<DateTime<Utc>> {
        let pattern = self.pattern;

        let remaining = pattern
            .occurrences
            .map(|cap| (cap.max(0) as usize).saturating_sub(pattern.generated_count()));
        let bound = remaining.map_or(max_to_generate, |r| r.min(max_to_generate));
        if bound == 0 {
            return Vec::new();
        }
        if pattern.end_date.is_some_and(|end| pattern.start_at > end) {
            return Vec::new();
        }

        let mut dates = Vec::with_capacity(bound.min(64));
        dates.push(pattern.start_at);
        while dates.len() < bound {
            let last = dates[dates.len() - 1];
            match self.next_occurrence(last + Duration::days(1)) {
                Some(next) => dates.push(next),
                None => break,
            }
        }
        dates
    }

    /// First anchored step of `step_days` days that is not before `from`.
    fn step_days(&self, step_days: i64, from: DateTime<Utc>) -> DateTime<Utc> {
        let start = self.pattern.start_at;
        if from <= start {
            return start;
        }
        let step_secs = Duration::days(step_days).num_seconds();
        let elapsed = (from - start).num_seconds();
        let whole_steps = elapsed.div_euclid(step_secs);
        let candidate = start + Duration::seconds(whole_steps * step_secs);
        if candidate < from {
            candidate + Duration::seconds(step_secs)
        } else {
            candidate
        }
    }

    /// First month-stepped candidate that is not before `from`. The day is
    /// clamped into each candidate month; the anchor's time-of-day is kept.
    fn step_months(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let pattern = self.pattern;
        // Validated as Some for monthly patterns.
        let day_of_month = pattern.day_of_month.unwrap_or(1) as u32;

        let mut offset: i64 = 0;
        loop {
            let candidate = month_candidate(pattern.start_at, offset, day_of_month);
            if candidate >= from {
                return candidate;
            }
            offset += pattern.interval;
        }
    }
}

/// Structural validation shared by the schedule constructor and pattern
/// creation.
pub fn validate_pattern(pattern: &RecurrencePattern) -> Result<(), CoreError> {
    if pattern.interval < 1 {
        return Err(CoreError::InvalidPattern(format!(
            "interval must be a positive integer, got {}",
            pattern.interval
        )));
    }

    match pattern.frequency {
        Frequency::Weekly | Frequency::Biweekly => {
            let day_of_week = pattern.day_of_week.ok_or_else(|| {
                CoreError::InvalidPattern(format!(
                    "{} patterns require day_of_week",
                    pattern.frequency
                ))
            })?;
            if !(0..=6).contains(&day_of_week) {
                return Err(CoreError::InvalidPattern(format!(
                    "day_of_week must be 0 (Sunday) through 6 (Saturday), got {day_of_week}"
                )));
            }
            if pattern.day_of_month.is_some() {
                return Err(CoreError::InvalidPattern(format!(
                    "day_of_month must not be set on {} patterns",
                    pattern.frequency
                )));
            }
        }
        Frequency::Monthly => {
            let day_of_month = pattern.day_of_month.ok_or_else(|| {
                CoreError::InvalidPattern("monthly patterns require day_of_month".to_string())
            })?;
            if !(1..=31).contains(&day_of_month) {
                return Err(CoreError::InvalidPattern(format!(
                    "day_of_month must be 1 through 31, got {day_of_month}"
                )));
            }
            if pattern.day_of_week.is_some() {
                return Err(CoreError::InvalidPattern(
                    "day_of_week must not be set on monthly patterns".to_string(),
                ));
            }
        }
    }

    if let Some(occurrences) = pattern.occurrences {
        if occurrences < 1 {
            return Err(CoreError::InvalidPattern(format!(
                "occurrences must be a positive integer, got {occurrences}"
            )));
        }
    }

    Ok(())
}

/// Candidate for the month `offset` months after the anchor's month, with
/// the requested day clamped to the month length and the anchor's
/// time-of-day attached.
fn month_candidate(anchor: DateTime<Utc>, offset: i64, day_of_month: u32) -> DateTime<Utc> {
    let months_total = i64::from(anchor.year()) * 12 + i64::from(anchor.month0()) + offset;
    let year = months_total.div_euclid(12) as i32;
    let month = months_total.rem_euclid(12) as u32 + 1;
    let day = day_of_month.min(last_day_of_month(year, month));
    // Infallible for a clamped day of a real month.
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_time(anchor.time())
        .and_utc()
}

/// Number of days in the given month.
fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

// ============================================================================
// Materialization policy
// ============================================================================

/// Tunables for converting occurrence dates into persisted bookings.
#[derive(Debug, Clone)]
pub struct MaterializationPolicy {
    /// How far ahead of now occurrences are materialized, in days
    pub lookahead_days: i64,
    /// Hard cap on bookings created per pattern per run
    pub max_batch_size: usize,
    /// Cap on occurrence dates resolved per run and per preview
    pub generation_cap: usize,
    /// Occurrences older than now minus this are not backfilled
    pub grace_hours: i64,
}

impl Default for MaterializationPolicy {
    fn default() -> Self {
        Self {
            lookahead_days: 90,
            max_batch_size: 50,
            generation_cap: 26,
            grace_hours: 1,
        }
    }
}

impl MaterializationPolicy {
    /// Latest occurrence date a run starting at `now` will materialize.
    pub fn horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.lookahead_days)
    }

    /// Earliest occurrence date a run starting at `now` will materialize.
    pub fn backfill_floor(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(self.grace_hours)
    }
}
