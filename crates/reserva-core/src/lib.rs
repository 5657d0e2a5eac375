//! # Reserva Core Library
//!
//! The scheduling engine behind the Reserva appointment platform: recurring
//! booking series with weekly, biweekly and monthly cadences, slot conflict
//! detection over provider calendars, and just-in-time materialization of
//! occurrences into persisted bookings.
//!
//! ## Features
//!
//! - **Recurring Series**: Weekly/biweekly/monthly cadences with interval
//!   multipliers, end dates, occurrence caps and short-month clamping
//! - **Conflict Detection**: Pure availability predicate over a provider's
//!   calendar, with an in-place exclusion for reschedules
//! - **Atomic Reservations**: Availability is re-checked inside the insert
//!   transaction, closing the check-then-book race
//! - **Timezone Awareness**: IANA zone labels for wall-clock rendering
//! - **Reminder Windows**: Day-before and hour-before lookahead queries
//! - **Type Safety**: Compile-time checked SQL queries with sqlx
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`recurrence`]: Occurrence resolution and sequence generation
//! - [`availability`]: Slot conflict detection
//! - [`timezone`]: Timezone utilities and validation
//! - [`error`]: Comprehensive error types with context
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use reserva_core::{
//!     db,
//!     models::{NewServiceData, NewStaffData},
//!     recurrence::MaterializationPolicy,
//!     repository::{Repository, ServiceRepository, SqliteRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Initialize database
//!     let pool = db::establish_connection("reserva.db").await?;
//!
//!     // Create repository with the default materialization policy
//!     let repo = SqliteRepository::new(pool, MaterializationPolicy::default());
//!
//!     // Register an offering and a provider
//!     let service = repo
//!         .add_service(NewServiceData {
//!             name: "60-minute coaching session".to_string(),
//!             duration_minutes: 60,
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Created service: {}", service.name);
//!
//!     Ok(())
//! }
//! ```

pub mod availability;
pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod timezone;
