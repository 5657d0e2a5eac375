use crate::error::CoreError;
use crate::models::{NewServiceData, NewStaffData, Service, Staff};
use crate::repository::SqliteRepository;
use crate::timezone;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::ServiceRepository for SqliteRepository {
    async fn add_service(&self, data: NewServiceData) -> Result<Service, CoreError> {
        if data.name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "Service name must not be empty".to_string(),
            ));
        }
        if data.duration_minutes < 1 {
            return Err(CoreError::InvalidInput(format!(
                "Service duration must be positive, got {}",
                data.duration_minutes
            )));
        }

        let service = Service {
            id: Uuid::now_v7(),
            name: data.name,
            description: data.description,
            duration_minutes: data.duration_minutes,
            price_cents: data.price_cents,
            active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO services (id, name, description, duration_minutes, price_cents, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price_cents)
        .bind(service.active)
        .bind(service.created_at)
        .execute(self.pool())
        .await?;

        Ok(service)
    }

    async fn find_service_by_id(&self, id: Uuid) -> Result<Option<Service>, CoreError> {
        let service = sqlx::query_as("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(service)
    }

    async fn find_services(&self) -> Result<Vec<Service>, CoreError> {
        let services = sqlx::query_as("SELECT * FROM services ORDER BY created_at")
            .fetch_all(self.pool())
            .await?;
        Ok(services)
    }

    async fn deactivate_service(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("UPDATE services SET active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Service {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl super::StaffRepository for SqliteRepository {
    async fn add_staff(&self, data: NewStaffData) -> Result<Staff, CoreError> {
        if data.name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "Staff name must not be empty".to_string(),
            ));
        }
        timezone::validate_timezone(&data.time_zone)?;

        let staff = Staff {
            id: Uuid::now_v7(),
            name: data.name,
            email: data.email,
            time_zone: data.time_zone,
            active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO staff (id, name, email, time_zone, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(staff.id)
        .bind(&staff.name)
        .bind(&staff.email)
        .bind(&staff.time_zone)
        .bind(staff.active)
        .bind(staff.created_at)
        .execute(self.pool())
        .await?;

        Ok(staff)
    }

    async fn find_staff_by_id(&self, id: Uuid) -> Result<Option<Staff>, CoreError> {
        let staff = sqlx::query_as("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(staff)
    }

    async fn find_staff(&self) -> Result<Vec<Staff>, CoreError> {
        let staff = sqlx::query_as("SELECT * FROM staff ORDER BY created_at")
            .fetch_all(self.pool())
            .await?;
        Ok(staff)
    }

    async fn deactivate_staff(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("UPDATE staff SET active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Staff {id} not found")));
        }
        Ok(())
    }
}
