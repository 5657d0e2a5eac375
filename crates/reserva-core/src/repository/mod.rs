use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Booking, BookingFilter, BookingStatus, MaterializationOutcome, NewBookingData, NewPatternData,
    NewServiceData, NewStaffData, PatternStatus, RecurrencePattern, ReminderWindow, Service, Staff,
};
use crate::recurrence::MaterializationPolicy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// Re-export domain modules
pub mod bookings;
pub mod catalog;
pub mod materialization;
pub mod patterns;
pub mod reminders;

// Traits are defined in this module and implemented in respective domain modules

/// Domain-specific trait for booking operations
#[async_trait]
pub trait BookingRepository {
    /// Creates a booking. The availability check runs again inside the insert
    /// transaction: this is the serialization point that turns the advisory
    /// `is_slot_available` answer into an atomic reservation.
    async fn create_booking(&self, data: NewBookingData) -> Result<Booking, CoreError>;
    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, CoreError>;
    async fn find_bookings_by_short_id_prefix(&self, prefix: &str) -> Result<Vec<Booking>, CoreError>;
    /// A provider's bookings overlapping the window; the conflict detector's
    /// input feed.
    async fn find_staff_bookings_between(
        &self,
        staff_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, CoreError>;
    async fn find_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, CoreError>;
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, CoreError>;
    /// Moves a booking in place, excluding it from its own conflict check.
    async fn reschedule_booking(
        &self,
        id: Uuid,
        new_start: DateTime<Utc>,
        new_end: Option<DateTime<Utc>>,
    ) -> Result<Booking, CoreError>;
}

/// Domain-specific trait for service catalog operations
#[async_trait]
pub trait ServiceRepository {
    async fn add_service(&self, data: NewServiceData) -> Result<Service, CoreError>;
    async fn find_service_by_id(&self, id: Uuid) -> Result<Option<Service>, CoreError>;
    async fn find_services(&self) -> Result<Vec<Service>, CoreError>;
    async fn deactivate_service(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for staff operations
#[async_trait]
pub trait StaffRepository {
    async fn add_staff(&self, data: NewStaffData) -> Result<Staff, CoreError>;
    async fn find_staff_by_id(&self, id: Uuid) -> Result<Option<Staff>, CoreError>;
    async fn find_staff(&self) -> Result<Vec<Staff>, CoreError>;
    async fn deactivate_staff(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for recurrence pattern operations
#[async_trait]
pub trait PatternRepository {
    async fn create_pattern(&self, data: NewPatternData) -> Result<RecurrencePattern, CoreError>;
    async fn find_pattern_by_id(&self, id: Uuid) -> Result<Option<RecurrencePattern>, CoreError>;
    async fn find_patterns_by_short_id_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<RecurrencePattern>, CoreError>;
    async fn find_active_patterns(&self) -> Result<Vec<RecurrencePattern>, CoreError>;
    /// Pause/resume/cancel/complete a series. Explicit operator or system
    /// action; occurrence arithmetic never transitions status on its own.
    async fn set_pattern_status(
        &self,
        id: Uuid,
        status: PatternStatus,
    ) -> Result<RecurrencePattern, CoreError>;
}

/// Domain-specific trait for materialization operations
#[async_trait]
pub trait MaterializationRepository {
    /// Converts upcoming occurrences of one pattern into bookings.
    async fn materialize_pattern(
        &self,
        pattern_id: Uuid,
    ) -> Result<MaterializationOutcome, CoreError>;
    /// Runs materialization over every active pattern.
    async fn materialize_active_patterns(&self) -> Result<Vec<MaterializationOutcome>, CoreError>;
}

/// Domain-specific trait for reminder lookahead queries
#[async_trait]
pub trait ReminderRepository {
    /// Bookings entering the given lookahead window that have not been
    /// flagged yet.
    async fn find_bookings_due_for_reminder(
        &self,
        window: ReminderWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, CoreError>;
    async fn mark_reminder_sent(
        &self,
        booking_id: Uuid,
        window: ReminderWindow,
    ) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    BookingRepository
    + ServiceRepository
    + StaffRepository
    + PatternRepository
    + MaterializationRepository
    + ReminderRepository
{
    // This trait automatically composes all domain-specific repositories
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    policy: MaterializationPolicy,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, policy: MaterializationPolicy) -> Self {
        Self { pool, policy }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get a reference to the materialization policy for internal use
    pub(crate) fn policy(&self) -> &MaterializationPolicy {
        &self.policy
    }
}

// The main Repository trait implementation will automatically be available
// when all domain trait implementations are defined
impl Repository for SqliteRepository {}
