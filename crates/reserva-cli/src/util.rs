use anyhow::{anyhow, Result};
use reserva_core::error::CoreError;
use reserva_core::models::{Service, Staff};
use reserva_core::repository::Repository;
use uuid::Uuid;

pub async fn resolve_booking_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let bookings = repo.find_bookings_by_short_id_prefix(short_id).await?;
    if bookings.len() == 1 {
        Ok(bookings[0].id)
    } else if bookings.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No booking found with ID prefix '{short_id}'"
        ))))
    } else {
        let info: Vec<(String, String)> = bookings
            .into_iter()
            .map(|b| (b.id.to_string(), format!("{} at {}", b.client_name, b.start_at)))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(info)))
    }
}

pub async fn resolve_pattern_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let patterns = repo.find_patterns_by_short_id_prefix(short_id).await?;
    if patterns.len() == 1 {
        Ok(patterns[0].id)
    } else if patterns.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No series found with ID prefix '{short_id}'"
        ))))
    } else {
        let info: Vec<(String, String)> = patterns
            .into_iter()
            .map(|p| (p.id.to_string(), format!("{} {}", p.frequency, p.client_name)))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(info)))
    }
}

/// Find a service by case-insensitive name prefix.
pub async fn resolve_service(repo: &impl Repository, name: &str) -> Result<Service> {
    let needle = name.to_lowercase();
    let matches: Vec<Service> = repo
        .find_services()
        .await?
        .into_iter()
        .filter(|s| s.active && s.name.to_lowercase().starts_with(&needle))
        .collect();

    match matches.len() {
        1 => Ok(matches.into_iter().next().unwrap()),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No active service matching '{name}'"
        )))),
        _ => {
            let info: Vec<(String, String)> = matches
                .into_iter()
                .map(|s| (s.id.to_string(), s.name))
                .collect();
            Err(anyhow!(CoreError::AmbiguousId(info)))
        }
    }
}

/// Find a staff member by case-insensitive name prefix.
pub async fn resolve_staff(repo: &impl Repository, name: &str) -> Result<Staff> {
    let needle = name.to_lowercase();
    let matches: Vec<Staff> = repo
        .find_staff()
        .await?
        .into_iter()
        .filter(|s| s.active && s.name.to_lowercase().starts_with(&needle))
        .collect();

    match matches.len() {
        1 => Ok(matches.into_iter().next().unwrap()),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No active staff member matching '{name}'"
        )))),
        _ => {
            let info: Vec<(String, String)> = matches
                .into_iter()
                .map(|s| (s.id.to_string(), s.name))
                .collect();
            Err(anyhow!(CoreError::AmbiguousId(info)))
        }
    }
}
