use anyhow::Result;
use chrono::Datelike;
use owo_colors::{OwoColorize, Style};
use reserva_core::models::{NewBookingData, NewPatternData};
use reserva_core::repository::Repository;

use crate::cli::BookCommand;
use crate::config::Config;
use crate::parser::{parse_weekday, parse_when};
use crate::timezone::normalize_timezone_input;

pub async fn book(repo: &impl Repository, command: BookCommand, config: &Config) -> Result<()> {
    let service = crate::util::resolve_service(repo, &command.service).await?;
    let staff = crate::util::resolve_staff(repo, &command.staff).await?;
    let start_at = parse_when(&command.at)?;

    let Some(cadence) = command.every else {
        return book_single(repo, command, service.id, staff.id, start_at).await;
    };

    let frequency = cadence.to_frequency();
    let time_zone = match &command.timezone {
        Some(tz) => normalize_timezone_input(tz)?,
        None => config.default_timezone.clone(),
    };

    use reserva_core::models::Frequency;
    let (day_of_week, day_of_month) = match frequency {
        Frequency::Weekly | Frequency::Biweekly => {
            let day = match &command.on {
                Some(on) => parse_weekday(on)?,
                None => i64::from(start_at.weekday().num_days_from_sunday()),
            };
            (Some(day), None)
        }
        Frequency::Monthly => {
            let day = command.day.unwrap_or(i64::from(start_at.day()));
            (None, Some(day))
        }
    };

    let end_date = command.until.as_deref().map(parse_when).transpose()?;

    let pattern = repo
        .create_pattern(NewPatternData {
            service_id: service.id,
            staff_id: staff.id,
            client_name: command.client.clone(),
            client_email: command.email.clone(),
            frequency,
            interval: command.interval,
            day_of_week,
            day_of_month,
            start_at,
            time_zone,
            duration_minutes: None,
            end_date,
            occurrences: command.count,
        })
        .await?;

    // Materialize the first window right away so the series shows up on the
    // provider's calendar.
    let outcome = repo.materialize_pattern(pattern.id).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();

    println!(
        "{} Created {} series for {} with {}",
        "✓".style(success_style),
        pattern.frequency,
        command.client.bright_white().bold(),
        staff.name
    );
    println!(
        "  {} Series ID: {}",
        "→".style(info_style),
        pattern.id.to_string().yellow()
    );
    println!(
        "  {} {} booking(s) scheduled",
        "→".style(info_style),
        outcome.created.len()
    );
    for booking in &outcome.created {
        println!(
            "    {} {}",
            "•".style(subtle_style),
            booking.start_at.format("%Y-%m-%d %H:%M")
        );
    }
    if !outcome.skipped_conflicts.is_empty() {
        println!(
            "  {} {} occurrence(s) skipped because the slot was taken:",
            "!".yellow().bold(),
            outcome.skipped_conflicts.len()
        );
        for date in &outcome.skipped_conflicts {
            println!(
                "    {} {}",
                "•".style(subtle_style),
                date.format("%Y-%m-%d %H:%M")
            );
        }
    }

    println!("\n{} Next steps:", "💡".style(subtle_style));
    println!(
        "   {} Preview upcoming: reserva recur preview {}",
        "•".style(subtle_style),
        pattern.id.to_string().yellow()
    );
    println!(
        "   {} Extend the calendar later: reserva materialize",
        "•".style(subtle_style)
    );

    Ok(())
}

async fn book_single(
    repo: &impl Repository,
    command: BookCommand,
    service_id: uuid::Uuid,
    staff_id: uuid::Uuid,
    start_at: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    let booking = repo
        .create_booking(NewBookingData {
            service_id,
            staff_id,
            client_name: command.client,
            client_email: command.email,
            start_at,
            end_at: None,
            notes: command.notes,
            status: None,
            pattern_id: None,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();

    println!(
        "{} Booked {} for {}",
        "✓".style(success_style),
        booking.start_at.format("%Y-%m-%d %H:%M").to_string().cyan(),
        booking.client_name.bright_white().bold()
    );
    println!(
        "  {} Booking ID: {}",
        "→".style(info_style),
        booking.id.to_string().yellow()
    );

    println!("\n{} Quick actions:", "💡".style(subtle_style));
    println!(
        "   {} Confirm: reserva confirm {}",
        "•".style(subtle_style),
        booking.id.to_string().yellow()
    );
    println!(
        "   {} Reschedule: reserva reschedule {} --to <time>",
        "•".style(subtle_style),
        booking.id.to_string().yellow()
    );

    Ok(())
}
