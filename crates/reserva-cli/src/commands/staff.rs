use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use reserva_core::models::NewStaffData;
use reserva_core::repository::Repository;

use crate::cli::{AddStaffCommand, DeactivateCommand, StaffCommand, StaffSubcommand};
use crate::timezone::{detect_system_timezone, normalize_timezone_input};
use crate::util::resolve_staff;
use crate::views::table::display_staff;

pub async fn staff_command(repo: &impl Repository, command: StaffCommand) -> Result<()> {
    match command.command {
        StaffSubcommand::Add(add) => add_staff(repo, add).await,
        StaffSubcommand::List => list_staff(repo).await,
        StaffSubcommand::Deactivate(deactivate) => deactivate_staff(repo, deactivate).await,
    }
}

async fn add_staff(repo: &impl Repository, command: AddStaffCommand) -> Result<()> {
    let time_zone = match command.timezone {
        Some(tz) => normalize_timezone_input(&tz)?,
        None => detect_system_timezone(),
    };

    let staff = repo
        .add_staff(NewStaffData {
            name: command.name,
            email: command.email,
            time_zone,
        })
        .await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Added staff member: {} ({})",
        "✓".style(success_style),
        staff.name.bright_white().bold(),
        staff.time_zone
    );
    Ok(())
}

async fn list_staff(repo: &impl Repository) -> Result<()> {
    let staff = repo.find_staff().await?;
    display_staff(&staff);
    Ok(())
}

async fn deactivate_staff(repo: &impl Repository, command: DeactivateCommand) -> Result<()> {
    let staff = resolve_staff(repo, &command.name).await?;
    repo.deactivate_staff(staff.id).await?;
    println!("{} is no longer taking bookings.", staff.name);
    Ok(())
}
