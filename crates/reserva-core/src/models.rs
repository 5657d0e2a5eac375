use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A bookable offering (e.g. "60-minute coaching session").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A service provider whose calendar is checked for conflicts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Staff {
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// IANA timezone name used when rendering this provider's calendar
    pub time_zone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[sqlx(rename = "no-show")]
    #[serde(rename = "no-show")]
    NoShow,
    Rescheduled,
}

impl BookingStatus {
    /// Whether a booking in this status occupies its slot on the provider's
    /// calendar. Cancelled and no-show bookings never block.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::NoShow)
    }

    /// Terminal statuses admit no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::NoShow => write!(f, "no-show"),
            BookingStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid booking status: {0}")]
pub struct ParseBookingStatusError(String);

impl FromStr for BookingStatus {
    type Err = ParseBookingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "no-show" | "noshow" | "no_show" => Ok(BookingStatus::NoShow),
            "rescheduled" => Ok(BookingStatus::Rescheduled),
            _ => Err(ParseBookingStatusError(s.to_string())),
        }
    }
}

/// A concrete appointment on a provider's calendar. For conflict detection
/// only `staff_id`, `start_at`, `end_at` and `status` matter; the rest is
/// booking-wizard payload.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub service_id: Uuid,
    pub staff_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    /// Back-reference to the recurrence pattern this booking was materialized
    /// from; None for one-off bookings.
    pub pattern_id: Option<Uuid>,
    pub day_reminder_sent: bool,
    pub hour_reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Booking {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            service_id: Uuid::now_v7(),
            staff_id: Uuid::now_v7(),
            client_name: "".to_string(),
            client_email: "".to_string(),
            start_at: now,
            end_at: now + chrono::Duration::minutes(60),
            status: BookingStatus::Pending,
            notes: None,
            pattern_id: None,
            day_reminder_sent: false,
            hour_reminder_sent: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Recurrence Models
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Frequency {
    /// Every `interval` weeks, on `day_of_week`
    Weekly,
    /// Every two weeks, on `day_of_week` (`interval` is not a multiplier here)
    Biweekly,
    /// Every `interval` months, on `day_of_month` (clamped in short months)
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Biweekly => write!(f, "biweekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0} (expected weekly, biweekly or monthly)")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" | "bi-weekly" | "fortnightly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum PatternStatus {
    Active,
    Paused,
    Cancelled,
    Completed,
}

impl PatternStatus {
    /// Cancelled and completed patterns never generate again.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PatternStatus::Cancelled | PatternStatus::Completed)
    }
}

impl std::fmt::Display for PatternStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternStatus::Active => write!(f, "active"),
            PatternStatus::Paused => write!(f, "paused"),
            PatternStatus::Cancelled => write!(f, "cancelled"),
            PatternStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid pattern status: {0}")]
pub struct ParsePatternStatusError(String);

impl FromStr for PatternStatus {
    type Err = ParsePatternStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PatternStatus::Active),
            "paused" => Ok(PatternStatus::Paused),
            "cancelled" => Ok(PatternStatus::Cancelled),
            "completed" => Ok(PatternStatus::Completed),
            _ => Err(ParsePatternStatusError(s.to_string())),
        }
    }
}

/// A recurring appointment series for one client with one provider.
///
/// `start_at` is the anchor: it is the first nominal session, it carries the
/// time-of-day reproduced on every occurrence, and for weekly/biweekly
/// patterns it is expected to fall on `day_of_week` (a precondition owned by
/// pattern creation, not by the stepping logic).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurrencePattern {
    /// Primary key, UUIDv7 for time-ordered performance
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    #[serde(with = "uuid::serde::compact")]
    pub service_id: Uuid,
    #[serde(with = "uuid::serde::compact")]
    pub staff_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub frequency: Frequency,
    /// Cadence multiplier (weeks or months). Must be >= 1.
    pub interval: i64,
    /// 0 = Sunday .. 6 = Saturday; set iff frequency is weekly/biweekly
    pub day_of_week: Option<i64>,
    /// 1..=31; set iff frequency is monthly
    pub day_of_month: Option<i64>,
    /// Wall-clock label of the session time in `time_zone`, e.g. "14:00"
    pub start_time: String,
    /// Anchor date-time of the series, stored in UTC
    pub start_at: DateTime<Utc>,
    /// IANA timezone name used to render occurrence wall-clock times
    pub time_zone: String,
    pub duration_minutes: i64,
    /// No occurrence may fall strictly after this
    pub end_date: Option<DateTime<Utc>>,
    /// Hard cap on total materialized bookings
    pub occurrences: Option<i64>,
    pub status: PatternStatus,
    /// Ordered ids of bookings already materialized from this pattern. The
    /// pattern owns this list; the bookings themselves live in `bookings`.
    pub generated_booking_ids: Json<Vec<Uuid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurrencePattern {
    /// Number of bookings already materialized from this pattern.
    #[inline]
    pub fn generated_count(&self) -> usize {
        self.generated_booking_ids.len()
    }

    /// Occurrence length derived from the service duration.
    #[inline]
    pub fn session_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duration_minutes)
    }
}

impl Default for RecurrencePattern {
    fn default() -> Self {
        use chrono::Datelike;
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            service_id: Uuid::now_v7(),
            staff_id: Uuid::now_v7(),
            client_name: "".to_string(),
            client_email: "".to_string(),
            frequency: Frequency::Weekly,
            interval: 1,
            day_of_week: Some(i64::from(now.weekday().num_days_from_sunday())),
            day_of_month: None,
            start_time: now.format("%H:%M").to_string(),
            start_at: now,
            time_zone: "UTC".to_string(),
            duration_minutes: 60,
            end_date: None,
            occurrences: None,
            status: PatternStatus::Active,
            generated_booking_ids: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Data Transfer Objects
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewServiceData {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone)]
pub struct NewStaffData {
    pub name: String,
    pub email: String,
    /// IANA timezone name; validated on insert
    pub time_zone: String,
}

/// Data required to create a one-off booking.
#[derive(Debug, Clone)]
pub struct NewBookingData {
    pub service_id: Uuid,
    pub staff_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub start_at: DateTime<Utc>,
    /// Defaults to `start_at` + the service duration when None
    pub end_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: Option<BookingStatus>,
    pub pattern_id: Option<Uuid>,
}

/// Data required to create a recurring series.
#[derive(Debug, Clone)]
pub struct NewPatternData {
    pub service_id: Uuid,
    pub staff_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub frequency: Frequency,
    /// Defaults to 1
    pub interval: Option<i64>,
    pub day_of_week: Option<i64>,
    pub day_of_month: Option<i64>,
    pub start_at: DateTime<Utc>,
    pub time_zone: String,
    /// Defaults to the service duration when None
    pub duration_minutes: Option<i64>,
    pub end_date: Option<DateTime<Utc>>,
    pub occurrences: Option<i64>,
}

/// Filters for listing bookings. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub staff_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Result of one materialization run over a single pattern.
#[derive(Debug, Clone)]
pub struct MaterializationOutcome {
    pub pattern_id: Uuid,
    /// Bookings created by this run, in occurrence order
    pub created: Vec<Booking>,
    /// Occurrence dates skipped because the provider's slot was taken
    pub skipped_conflicts: Vec<DateTime<Utc>>,
    /// The series has no further occurrences (cap or end date reached)
    pub exhausted: bool,
}

impl MaterializationOutcome {
    pub fn empty(pattern_id: Uuid) -> Self {
        Self {
            pattern_id,
            created: Vec::new(),
            skipped_conflicts: Vec::new(),
            exhausted: false,
        }
    }
}

/// Fixed lookahead windows the reminder collaborator queries (§ reminder
/// delivery itself is out of scope for the core).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderWindow {
    /// ~24 hours before the session
    DayBefore,
    /// ~1 hour before the session
    HourBefore,
}

impl ReminderWindow {
    /// How far ahead of the session the window is centered.
    pub fn lead(&self) -> chrono::Duration {
        match self {
            ReminderWindow::DayBefore => chrono::Duration::hours(24),
            ReminderWindow::HourBefore => chrono::Duration::hours(1),
        }
    }

    /// Half-width of the window around `now + lead`.
    pub fn tolerance(&self) -> chrono::Duration {
        match self {
            ReminderWindow::DayBefore => chrono::Duration::minutes(30),
            ReminderWindow::HourBefore => chrono::Duration::minutes(15),
        }
    }
}

impl std::fmt::Display for ReminderWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderWindow::DayBefore => write!(f, "day-before"),
            ReminderWindow::HourBefore => write!(f, "hour-before"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_status_round_trips_through_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
            BookingStatus::Rescheduled,
        ] {
            let parsed: BookingStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("definitely-not-a-status".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn blocking_statuses_exclude_cancelled_and_no_show() {
        assert!(BookingStatus::Pending.is_blocking());
        assert!(BookingStatus::Confirmed.is_blocking());
        assert!(BookingStatus::Completed.is_blocking());
        assert!(BookingStatus::Rescheduled.is_blocking());
        assert!(!BookingStatus::Cancelled.is_blocking());
        assert!(!BookingStatus::NoShow.is_blocking());
    }

    #[test]
    fn frequency_accepts_common_spellings() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("bi-weekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn reminder_windows_are_ordered_sensibly() {
        assert!(ReminderWindow::DayBefore.lead() > ReminderWindow::HourBefore.lead());
        assert!(ReminderWindow::DayBefore.tolerance() > ReminderWindow::HourBefore.tolerance());
    }
}
