use anyhow::Result;
use chrono::Utc;
use reserva_core::models::ReminderWindow;
use reserva_core::repository::Repository;
use std::collections::HashMap;
use uuid::Uuid;

use crate::cli::{RemindCommand, RemindDueCommand, RemindMarkCommand, RemindSubcommand};
use crate::util::resolve_booking_id;
use crate::views::table::{display_bookings, ViewBooking};

pub async fn remind_command(repo: &impl Repository, command: RemindCommand) -> Result<()> {
    match command.command {
        RemindSubcommand::Due(due) => remind_due(repo, due).await,
        RemindSubcommand::Mark(mark) => remind_mark(repo, mark).await,
    }
}

async fn remind_due(repo: &impl Repository, command: RemindDueCommand) -> Result<()> {
    let now = Utc::now();
    let windows: Vec<ReminderWindow> = match command.window {
        Some(window) => vec![window.to_window()],
        None => vec![ReminderWindow::DayBefore, ReminderWindow::HourBefore],
    };

    let staff_names: HashMap<Uuid, String> = repo
        .find_staff()
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let service_names: HashMap<Uuid, String> = repo
        .find_services()
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    for window in windows {
        let due = repo.find_bookings_due_for_reminder(window, now).await?;
        println!("Reminders due ({window}):");
        let views: Vec<ViewBooking> = due
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
    }

    Ok(())
}

async fn remind_mark(repo: &impl Repository, command: RemindMarkCommand) -> Result<()> {
    let id = resolve_booking_id(repo, &command.id).await?;
    let window = command.window.to_window();
    repo.mark_reminder_sent(id, window).await?;
    println!("Flagged {window} reminder as sent.");
    Ok(())
}
