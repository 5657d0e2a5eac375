use crate::availability::conflicting_bookings;
use crate::error::CoreError;
use crate::models::{Booking, BookingFilter, BookingStatus, NewBookingData, Service, Staff};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::BookingRepository for SqliteRepository {
    async fn create_booking(&self, data: NewBookingData) -> Result<Booking, CoreError> {
        let mut tx = self.pool().begin().await?;

        let service: Service = sqlx::query_as("SELECT * FROM services WHERE id = $1")
            .bind(data.service_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Service {} not found", data.service_id)))?;

        if !service.active {
            return Err(CoreError::InvalidInput(format!(
                "Service '{}' is no longer offered",
                service.name
            )));
        }

        let staff: Staff = sqlx::query_as("SELECT * FROM staff WHERE id = $1")
            .bind(data.staff_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Staff {} not found", data.staff_id)))?;

        if !staff.active {
            return Err(CoreError::InvalidInput(format!(
                "Staff member '{}' is not taking bookings",
                staff.name
            )));
        }

        let start_at = data.start_at;
        let end_at = data
            .end_at
            .unwrap_or(start_at + chrono::Duration::minutes(service.duration_minutes));

        if end_at <= start_at {
            return Err(CoreError::InvalidInput(format!(
                "Booking must end after it starts ({start_at} .. {end_at})"
            )));
        }

        // Availability was checked before this call at best; re-check inside
        // the transaction so two racing requests cannot both insert.
        Self::ensure_slot_free_in_tx(&mut tx, data.staff_id, start_at, end_at, None).await?;

        let booking = Booking {
            id: Uuid::now_v7(),
            service_id: data.service_id,
            staff_id: data.staff_id,
            client_name: data.client_name,
            client_email: data.client_email,
            start_at,
            end_at,
            status: data.status.unwrap_or(BookingStatus::Pending),
            notes: data.notes,
            pattern_id: data.pattern_id,
            day_reminder_sent: false,
            hour_reminder_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        Self::insert_booking_in_tx(&mut tx, &booking).await?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, CoreError> {
        let booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(booking)
    }

    async fn find_bookings_by_short_id_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<Booking>, CoreError> {
        let bookings = sqlx::query_as(
            "SELECT * FROM bookings WHERE lower(hex(id)) LIKE $1 ORDER BY start_at",
        )
        .bind(format!("{}%", prefix.to_lowercase().replace('-', "")))
        .fetch_all(self.pool())
        .await?;
        Ok(bookings)
    }

    async fn find_staff_bookings_between(
        &self,
        staff_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, CoreError> {
        let bookings = sqlx::query_as(
            r#"SELECT * FROM bookings
            WHERE staff_id = $1
            AND start_at < $3 AND end_at > $2
            ORDER BY start_at"#,
        )
        .bind(staff_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(self.pool())
        .await?;
        Ok(bookings)
    }

    async fn find_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM bookings WHERE 1 = 1");

        if let Some(staff_id) = filter.staff_id {
            qb.push(" AND staff_id = ");
            qb.push_bind(staff_id);
        }
        if let Some(status) = &filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.to_string());
        }
        if let Some(from) = filter.from {
            qb.push(" AND start_at >= ");
            qb.push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND start_at <= ");
            qb.push_bind(to);
        }
        qb.push(" ORDER BY start_at");

        let bookings = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(bookings)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, CoreError> {
        let mut tx = self.pool().begin().await?;

        let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {id} not found")))?;

        if booking.status.is_terminal() && status != booking.status {
            return Err(CoreError::InvalidInput(format!(
                "Booking is already {} and cannot become {}",
                booking.status, status
            )));
        }

        sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(&status)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let updated: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn reschedule_booking(
        &self,
        id: Uuid,
        new_start: DateTime<Utc>,
        new_end: Option<DateTime<Utc>>,
    ) -> Result<Booking, CoreError> {
        let mut tx = self.pool().begin().await?;

        let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {id} not found")))?;

        if booking.status.is_terminal() {
            return Err(CoreError::InvalidInput(format!(
                "A {} booking cannot be rescheduled",
                booking.status
            )));
        }

        let new_end = new_end.unwrap_or(new_start + (booking.end_at - booking.start_at));
        if new_end <= new_start {
            return Err(CoreError::InvalidInput(format!(
                "Booking must end after it starts ({new_start} .. {new_end})"
            )));
        }

        // The booking itself is excluded so moving inside its own slot works.
        Self::ensure_slot_free_in_tx(&mut tx, booking.staff_id, new_start, new_end, Some(id))
            .await?;

        sqlx::query(
            "UPDATE bookings SET start_at = $1, end_at = $2, status = $3, updated_at = $4 WHERE id = $5",
        )
        .bind(new_start)
        .bind(new_end)
        .bind(BookingStatus::Rescheduled)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let updated: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

impl SqliteRepository {
    /// Loads a provider's bookings overlapping the window, inside the given
    /// transaction. The SQL prefilter is a superset of the exact conflict
    /// predicate; the in-memory detector makes the final call.
    pub(crate) async fn blocking_bookings_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        staff_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, CoreError> {
        let bookings = sqlx::query_as(
            r#"SELECT * FROM bookings
            WHERE staff_id = $1
            AND status NOT IN ('cancelled', 'no-show')
            AND start_at < $3 AND end_at > $2
            ORDER BY start_at"#,
        )
        .bind(staff_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&mut **tx)
        .await?;
        Ok(bookings)
    }

    /// Transactional re-check: the atomic counterpart of the advisory
    /// `is_slot_available` predicate.
    pub(crate) async fn ensure_slot_free_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        staff_id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<(), CoreError> {
        let existing = Self::blocking_bookings_in_tx(tx, staff_id, start_at, end_at).await?;
        let blockers =
            conflicting_bookings(staff_id, start_at, end_at, &existing, exclude_booking_id);
        if blockers.is_empty() {
            Ok(())
        } else {
            Err(CoreError::SlotConflict {
                staff_id,
                start_at,
                end_at,
            })
        }
    }

    /// Insert a booking row within an existing transaction
    pub(crate) async fn insert_booking_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        booking: &Booking,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO bookings (id, service_id, staff_id, client_name, client_email, start_at, end_at, status, notes, pattern_id, day_reminder_sent, hour_reminder_sent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(booking.id)
        .bind(booking.service_id)
        .bind(booking.staff_id)
        .bind(&booking.client_name)
        .bind(&booking.client_email)
        .bind(booking.start_at)
        .bind(booking.end_at)
        .bind(&booking.status)
        .bind(&booking.notes)
        .bind(booking.pattern_id)
        .bind(booking.day_reminder_sent)
        .bind(booking.hour_reminder_sent)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
