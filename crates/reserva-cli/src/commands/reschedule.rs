use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use reserva_core::repository::Repository;

use crate::cli::RescheduleCommand;
use crate::parser::parse_when;
use crate::util::resolve_booking_id;

pub async fn reschedule(repo: &impl Repository, command: RescheduleCommand) -> Result<()> {
    let id = resolve_booking_id(repo, &command.id).await?;
    let new_start = parse_when(&command.to)?;

    let booking = repo.reschedule_booking(id, new_start, None).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Moved {}'s session to {}",
        "✓".style(success_style),
        booking.client_name.bright_white().bold(),
        booking
            .start_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .cyan()
    );
    Ok(())
}
