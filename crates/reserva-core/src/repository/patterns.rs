use crate::error::CoreError;
use crate::models::{NewPatternData, PatternStatus, RecurrencePattern, Service, Staff};
use crate::recurrence::validate_pattern;
use crate::repository::SqliteRepository;
use crate::timezone;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use sqlx::types::Json;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::PatternRepository for SqliteRepository {
    async fn create_pattern(&self, data: NewPatternData) -> Result<RecurrencePattern, CoreError> {
        let mut tx = self.pool().begin().await?;

        timezone::validate_timezone(&data.time_zone)?;

        let service: Service = sqlx::query_as("SELECT * FROM services WHERE id = $1")
            .bind(data.service_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Service {} not found", data.service_id)))?;

        let _staff: Staff = sqlx::query_as("SELECT * FROM staff WHERE id = $1")
            .bind(data.staff_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Staff {} not found", data.staff_id)))?;

        let pattern = RecurrencePattern {
            id: Uuid::now_v7(),
            service_id: data.service_id,
            staff_id: data.staff_id,
            client_name: data.client_name,
            client_email: data.client_email,
            frequency: data.frequency,
            interval: data.interval.unwrap_or(1),
            day_of_week: data.day_of_week,
            day_of_month: data.day_of_month,
            start_time: timezone::wall_clock_label(data.start_at, &data.time_zone)?,
            start_at: data.start_at,
            time_zone: data.time_zone,
            duration_minutes: data.duration_minutes.unwrap_or(service.duration_minutes),
            end_date: data.end_date,
            occurrences: data.occurrences,
            status: PatternStatus::Active,
            generated_booking_ids: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        validate_pattern(&pattern)?;

        // The stepping logic assumes the anchor already sits on the requested
        // weekday; creation is where that assumption is enforced.
        if let Some(day_of_week) = pattern.day_of_week {
            let anchor_day = i64::from(pattern.start_at.weekday().num_days_from_sunday());
            if anchor_day != day_of_week {
                return Err(CoreError::InvalidInput(format!(
                    "Series start {} falls on weekday {anchor_day}, not the requested day_of_week {day_of_week}",
                    pattern.start_at
                )));
            }
        }

        sqlx::query(
            r#"INSERT INTO recurrence_patterns (id, service_id, staff_id, client_name, client_email, frequency, interval, day_of_week, day_of_month, start_time, start_at, time_zone, duration_minutes, end_date, occurrences, status, generated_booking_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)"#,
        )
        .bind(pattern.id)
        .bind(pattern.service_id)
        .bind(pattern.staff_id)
        .bind(&pattern.client_name)
        .bind(&pattern.client_email)
        .bind(&pattern.frequency)
        .bind(pattern.interval)
        .bind(pattern.day_of_week)
        .bind(pattern.day_of_month)
        .bind(&pattern.start_time)
        .bind(pattern.start_at)
        .bind(&pattern.time_zone)
        .bind(pattern.duration_minutes)
        .bind(pattern.end_date)
        .bind(pattern.occurrences)
        .bind(&pattern.status)
        .bind(&pattern.generated_booking_ids)
        .bind(pattern.created_at)
        .bind(pattern.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(pattern)
    }

    async fn find_pattern_by_id(&self, id: Uuid) -> Result<Option<RecurrencePattern>, CoreError> {
        let pattern = sqlx::query_as("SELECT * FROM recurrence_patterns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(pattern)
    }

    async fn find_patterns_by_short_id_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<RecurrencePattern>, CoreError> {
        let patterns = sqlx::query_as(
            "SELECT * FROM recurrence_patterns WHERE lower(hex(id)) LIKE $1 ORDER BY created_at",
        )
        .bind(format!("{}%", prefix.to_lowercase().replace('-', "")))
        .fetch_all(self.pool())
        .await?;
        Ok(patterns)
    }

    async fn find_active_patterns(&self) -> Result<Vec<RecurrencePattern>, CoreError> {
        let patterns = sqlx::query_as(
            "SELECT * FROM recurrence_patterns WHERE status = 'active' ORDER BY created_at",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(patterns)
    }

    async fn set_pattern_status(
        &self,
        id: Uuid,
        status: PatternStatus,
    ) -> Result<RecurrencePattern, CoreError> {
        let mut tx = self.pool().begin().await?;

        let pattern: RecurrencePattern =
            sqlx::query_as("SELECT * FROM recurrence_patterns WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Pattern {id} not found")))?;

        if pattern.status.is_terminal() && status != pattern.status {
            return Err(CoreError::InvalidInput(format!(
                "Series is already {} and cannot become {}",
                pattern.status, status
            )));
        }

        sqlx::query("UPDATE recurrence_patterns SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(&status)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let updated: RecurrencePattern =
            sqlx::query_as("SELECT * FROM recurrence_patterns WHERE id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

impl SqliteRepository {
    /// Persist the pattern's grown booking-id list within an existing
    /// transaction. The list length may never exceed the occurrences cap;
    /// materialization is responsible for respecting that before calling.
    pub(crate) async fn store_generated_ids_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        pattern_id: Uuid,
        generated_booking_ids: &Json<Vec<Uuid>>,
    ) -> Result<(), CoreError> {
        let result = sqlx::query(
            "UPDATE recurrence_patterns SET generated_booking_ids = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(generated_booking_ids)
        .bind(Utc::now())
        .bind(pattern_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Pattern {pattern_id} not found")));
        }
        Ok(())
    }

    /// Status update within an existing transaction (used when a
    /// materialization run finds the series exhausted).
    pub(crate) async fn set_pattern_status_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        pattern_id: Uuid,
        status: PatternStatus,
    ) -> Result<(), CoreError> {
        sqlx::query("UPDATE recurrence_patterns SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(&status)
            .bind(Utc::now())
            .bind(pattern_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
