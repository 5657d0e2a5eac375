use anyhow::Result;
use reserva_core::models::{BookingFilter, BookingStatus};
use reserva_core::repository::Repository;
use std::collections::HashMap;
use uuid::Uuid;

use crate::cli::ListCommand;
use crate::parser::parse_when;
use crate::util::resolve_staff;
use crate::views::table::{display_bookings, ViewBooking};

pub async fn list_bookings(repo: &impl Repository, command: ListCommand) -> Result<()> {
    let staff_id = match &command.staff {
        Some(name) => Some(resolve_staff(repo, name).await?.id),
        None => None,
    };
    let status = command
        .status
        .as_deref()
        .map(|s| s.parse::<BookingStatus>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let from = command.from.as_deref().map(parse_when).transpose()?;
    let to = command.to.as_deref().map(parse_when).transpose()?;

    let bookings = repo
        .find_bookings(&BookingFilter {
            staff_id,
            status,
            from,
            to,
        })
        .await?;

    let service_names: HashMap<Uuid, String> = repo
        .find_services()
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let staff_names: HashMap<Uuid, String> = repo
        .find_staff()
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let views: Vec<ViewBooking> = bookings
        .into_iter()
        .map(|b| ViewBooking {
            id: b.id,
            client_name: b.client_name,
            service_name: service_names
                .get(&b.service_id)
                .cloned()
                .unwrap_or_else(|| "-".to_string()),
            staff_name: staff_names
                .get(&b.staff_id)
                .cloned()
                .unwrap_or_else(|| "-".to_string()),
            start_at: b.start_at,
            end_at: b.end_at,
            status: b.status,
            recurring: b.pattern_id.is_some(),
        })
        .collect();

    display_bookings(&views);
    Ok(())
}
