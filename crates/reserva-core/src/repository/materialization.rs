use crate::availability::conflicting_bookings;
use crate::error::CoreError;
use crate::models::{
    Booking, BookingStatus, MaterializationOutcome, PatternStatus, RecurrencePattern,
};
use crate::recurrence::RecurrenceSchedule;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

#[async_trait]
impl super::MaterializationRepository for SqliteRepository {
    /// Walks a pattern's upcoming occurrences and persists each one that is
    /// inside the lookahead horizon, not yet materialized, and free of
    /// conflicts on the provider's calendar. Occurrences whose slot is taken
    /// are reported and skipped; they do not consume the series budget.
    ///
    /// The whole run is one transaction: the conflict check for every
    /// occurrence happens against calendar state that cannot change under it.
    /// When the series has nothing left to produce, the pattern is marked
    /// completed here; the occurrence arithmetic itself only reports
    /// exhaustion.
    async fn materialize_pattern(
        &self,
        pattern_id: Uuid,
    ) -> Result<MaterializationOutcome, CoreError> {
        let mut tx = self.pool().begin().await?;

        let mut pattern: RecurrencePattern =
            sqlx::query_as("SELECT * FROM recurrence_patterns WHERE id = $1")
                .bind(pattern_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Pattern {pattern_id} not found")))?;

        if pattern.status != PatternStatus::Active {
            return Err(CoreError::InvalidInput(format!(
                "Series is {}; only active series materialize",
                pattern.status
            )));
        }

        let now = Utc::now();
        let horizon = self.policy().horizon(now);
        let backfill_floor = self.policy().backfill_floor(now);
        let max_batch_size = self.policy().max_batch_size;

        let materialized: Vec<Booking> = sqlx::query_as(
            "SELECT * FROM bookings WHERE pattern_id = $1 ORDER BY start_at",
        )
        .bind(pattern_id)
        .fetch_all(&mut *tx)
        .await?;

        let materialized_starts: HashSet<DateTime<Utc>> =
            materialized.iter().map(|b| b.start_at).collect();
        let frontier = materialized.last().map(|b| b.start_at);

        let mut outcome = MaterializationOutcome::empty(pattern_id);

        // A fresh series starts at its anchor; an already-started series
        // resumes one day past its newest booking.
        let mut next = match frontier {
            None => {
                // Validation happens up front even when the anchor is taken
                // as-is.
                RecurrenceSchedule::new(&pattern)?;
                first_session(&pattern)
            }
            Some(last) => {
                RecurrenceSchedule::new(&pattern)?.next_occurrence(last + Duration::days(1))
            }
        };

        while let Some(occurrence_at) = next {
            if occurrence_at > horizon || outcome.created.len() >= max_batch_size {
                // Window or batch limit; the series itself is not done.
                break;
            }

            if occurrence_at < backfill_floor || materialized_starts.contains(&occurrence_at) {
                next = RecurrenceSchedule::new(&pattern)?
                    .next_occurrence(occurrence_at + Duration::days(1));
                continue;
            }

            let session_end = occurrence_at + pattern.session_duration();
            let window = Self::blocking_bookings_in_tx(
                &mut tx,
                pattern.staff_id,
                occurrence_at,
                session_end,
            )
            .await?;
            let blockers = conflicting_bookings(
                pattern.staff_id,
                occurrence_at,
                session_end,
                &window,
                None,
            );

            if blockers.is_empty() {
                let booking = Booking {
                    id: Uuid::now_v7(),
                    service_id: pattern.service_id,
                    staff_id: pattern.staff_id,
                    client_name: pattern.client_name.clone(),
                    client_email: pattern.client_email.clone(),
                    start_at: occurrence_at,
                    end_at: session_end,
                    status: BookingStatus::Confirmed,
                    notes: None,
                    pattern_id: Some(pattern_id),
                    day_reminder_sent: false,
                    hour_reminder_sent: false,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };

                Self::insert_booking_in_tx(&mut tx, &booking).await?;
                pattern.generated_booking_ids.0.push(booking.id);
                outcome.created.push(booking);
            } else {
                outcome.skipped_conflicts.push(occurrence_at);
            }

            next = RecurrenceSchedule::new(&pattern)?
                .next_occurrence(occurrence_at + Duration::days(1));
        }

        outcome.exhausted = next.is_none();

        if !outcome.created.is_empty() {
            Self::store_generated_ids_in_tx(&mut tx, pattern_id, &pattern.generated_booking_ids)
                .await?;
        }
        if outcome.exhausted {
            Self::set_pattern_status_in_tx(&mut tx, pattern_id, PatternStatus::Completed).await?;
        }

        tx.commit().await?;
        Ok(outcome)
    }

    async fn materialize_active_patterns(&self) -> Result<Vec<MaterializationOutcome>, CoreError> {
        let active: Vec<RecurrencePattern> = sqlx::query_as(
            "SELECT * FROM recurrence_patterns WHERE status = 'active' ORDER BY created_at",
        )
        .fetch_all(self.pool())
        .await?;

        let mut outcomes = Vec::with_capacity(active.len());
        for pattern in active {
            outcomes.push(self.materialize_pattern(pattern.id).await?);
        }
        Ok(outcomes)
    }
}

/// The anchor is the nominal first session; it is only suppressed when the
/// series is born already past its ceilings.
fn first_session(pattern: &RecurrencePattern) -> Option<DateTime<Utc>> {
    if let Some(cap) = pattern.occurrences {
        if pattern.generated_count() as i64 >= cap {
            return None;
        }
    }
    if pattern.end_date.is_some_and(|end| pattern.start_at > end) {
        return None;
    }
    Some(pattern.start_at)
}
