use crate::error::CoreError;
use crate::models::{Booking, ReminderWindow};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
impl super::ReminderRepository for SqliteRepository {
    async fn find_bookings_due_for_reminder(
        &self,
        window: ReminderWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, CoreError> {
        let center = now + window.lead();
        let from = center - window.tolerance();
        let to = center + window.tolerance();

        // Only sessions that will actually happen get reminded about.
        let query = match window {
            ReminderWindow::DayBefore => {
                r#"SELECT * FROM bookings
                WHERE status IN ('pending', 'confirmed', 'rescheduled')
                AND day_reminder_sent = FALSE
                AND start_at BETWEEN $1 AND $2
                ORDER BY start_at"#
            }
            ReminderWindow::HourBefore => {
                r#"SELECT * FROM bookings
                WHERE status IN ('pending', 'confirmed', 'rescheduled')
                AND hour_reminder_sent = FALSE
                AND start_at BETWEEN $1 AND $2
                ORDER BY start_at"#
            }
        };

        let bookings = sqlx::query_as(query)
            .bind(from)
            .bind(to)
            .fetch_all(self.pool())
            .await?;
        Ok(bookings)
    }

    async fn mark_reminder_sent(
        &self,
        booking_id: Uuid,
        window: ReminderWindow,
    ) -> Result<(), CoreError> {
        let query = match window {
            ReminderWindow::DayBefore => {
                "UPDATE bookings SET day_reminder_sent = TRUE, updated_at = $1 WHERE id = $2"
            }
            ReminderWindow::HourBefore => {
                "UPDATE bookings SET hour_reminder_sent = TRUE, updated_at = $1 WHERE id = $2"
            }
        };

        let result = sqlx::query(query)
            .bind(Utc::now())
            .bind(booking_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Booking {booking_id} not found")));
        }
        Ok(())
    }
}
