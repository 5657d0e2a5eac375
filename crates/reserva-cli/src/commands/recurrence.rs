use anyhow::Result;
use chrono::Utc;
use owo_colors::{OwoColorize, Style};
use reserva_core::models::PatternStatus;
use reserva_core::recurrence::RecurrenceSchedule;
use reserva_core::repository::Repository;

use crate::cli::{RecurCommand, RecurIdCommand, RecurPreviewCommand, RecurSubcommand};
use crate::config::Config;
use crate::util::resolve_pattern_id;
use crate::views::table::{display_occurrences, display_patterns};

pub async fn recur_command(
    repo: &impl Repository,
    command: RecurCommand,
    config: &Config,
) -> Result<()> {
    match command.command {
        RecurSubcommand::Info(info) => series_info(repo, info).await,
        RecurSubcommand::Preview(preview) => series_preview(repo, preview, config).await,
        RecurSubcommand::Pause(id) => set_status(repo, id, PatternStatus::Paused).await,
        RecurSubcommand::Resume(id) => set_status(repo, id, PatternStatus::Active).await,
        RecurSubcommand::Cancel(id) => set_status(repo, id, PatternStatus::Cancelled).await,
    }
}

async fn series_info(repo: &impl Repository, command: RecurIdCommand) -> Result<()> {
    let id = resolve_pattern_id(repo, &command.id).await?;
    let pattern = repo
        .find_pattern_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Series {id} not found"))?;

    display_patterns(std::slice::from_ref(&pattern));

    let info_style = Style::new().blue();
    if let Some(end) = pattern.end_date {
        println!(
            "  {} Runs until {}",
            "→".style(info_style),
            end.format("%Y-%m-%d")
        );
    }
    let schedule = RecurrenceSchedule::new(&pattern)?;
    match schedule.next_occurrence(Utc::now()) {
        Some(next) => println!(
            "  {} Next occurrence: {}",
            "→".style(info_style),
            next.format("%Y-%m-%d %H:%M").to_string().cyan()
        ),
        None => println!("  {} Series has no further occurrences", "→".style(info_style)),
    }

    Ok(())
}

async fn series_preview(
    repo: &impl Repository,
    command: RecurPreviewCommand,
    config: &Config,
) -> Result<()> {
    let id = resolve_pattern_id(repo, &command.id).await?;
    let pattern = repo
        .find_pattern_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Series {id} not found"))?;

    let schedule = RecurrenceSchedule::new(&pattern)?;
    let cap = command.count.min(config.materialization.generation_cap);
    let dates = schedule.occurrence_dates(cap);

    display_occurrences(&dates, &pattern.time_zone);
    Ok(())
}

async fn set_status(
    repo: &impl Repository,
    command: RecurIdCommand,
    status: PatternStatus,
) -> Result<()> {
    let id = resolve_pattern_id(repo, &command.id).await?;
    let pattern = repo.set_pattern_status(id, status).await?;

    let verb = match pattern.status {
        PatternStatus::Active => "Resumed",
        PatternStatus::Paused => "Paused",
        PatternStatus::Cancelled => "Cancelled",
        PatternStatus::Completed => "Completed",
    };
    println!("{} series for {}.", verb, pattern.client_name);
    Ok(())
}
