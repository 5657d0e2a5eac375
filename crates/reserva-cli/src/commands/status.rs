use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use reserva_core::models::BookingStatus;
use reserva_core::repository::Repository;

use crate::cli::{CompleteCommand, ConfirmCommand};
use crate::util::resolve_booking_id;

pub async fn confirm_booking(repo: &impl Repository, command: ConfirmCommand) -> Result<()> {
    let id = resolve_booking_id(repo, &command.id).await?;
    let booking = repo
        .update_booking_status(id, BookingStatus::Confirmed)
        .await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Confirmed {} on {}",
        "✓".style(success_style),
        booking.client_name.bright_white().bold(),
        booking.start_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

pub async fn complete_booking(repo: &impl Repository, command: CompleteCommand) -> Result<()> {
    let id = resolve_booking_id(repo, &command.id).await?;
    let status = if command.no_show {
        BookingStatus::NoShow
    } else {
        BookingStatus::Completed
    };
    let booking = repo.update_booking_status(id, status).await?;

    if command.no_show {
        println!(
            "Recorded {} as a no-show for {}.",
            booking.client_name,
            booking.start_at.format("%Y-%m-%d %H:%M")
        );
    } else {
        let success_style = Style::new().green().bold();
        println!(
            "{} Completed session with {}",
            "✓".style(success_style),
            booking.client_name.bright_white().bold()
        );
    }
    Ok(())
}

pub async fn cancel_booking(repo: &impl Repository, id: uuid::Uuid) -> Result<()> {
    let booking = repo
        .update_booking_status(id, BookingStatus::Cancelled)
        .await?;
    println!(
        "Cancelled {}'s booking on {}.",
        booking.client_name,
        booking.start_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}
