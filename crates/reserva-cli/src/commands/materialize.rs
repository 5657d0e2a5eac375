use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use reserva_core::models::MaterializationOutcome;
use reserva_core::repository::Repository;

use crate::cli::MaterializeCommand;
use crate::util::resolve_pattern_id;

pub async fn materialize(repo: &impl Repository, command: MaterializeCommand) -> Result<()> {
    let outcomes = match command.series {
        Some(short_id) => {
            let id = resolve_pattern_id(repo, &short_id).await?;
            vec![repo.materialize_pattern(id).await?]
        }
        None => repo.materialize_active_patterns().await?,
    };

    if outcomes.is_empty() {
        println!("No active series to materialize.");
        return Ok(());
    }

    let created: usize = outcomes.iter().map(|o| o.created.len()).sum();
    let skipped: usize = outcomes.iter().map(|o| o.skipped_conflicts.len()).sum();
    let exhausted: usize = outcomes.iter().filter(|o| o.exhausted).count();

    let success_style = Style::new().green().bold();
    println!(
        "{} Materialized {} booking(s) across {} series",
        "✓".style(success_style),
        created,
        outcomes.len()
    );
    if skipped > 0 {
        println!(
            "  {} {} occurrence(s) skipped due to calendar conflicts",
            "!".yellow().bold(),
            skipped
        );
        for outcome in outcomes.iter().filter(|o| !o.skipped_conflicts.is_empty()) {
            print_skips(outcome);
        }
    }
    if exhausted > 0 {
        println!("  {} {} series completed their run", "→".blue(), exhausted);
    }

    Ok(())
}

fn print_skips(outcome: &MaterializationOutcome) {
    let subtle_style = Style::new().bright_black();
    for date in &outcome.skipped_conflicts {
        println!(
            "    {} series {}: {}",
            "•".style(subtle_style),
            outcome.pattern_id.simple().to_string()[..7].to_string(),
            date.format("%Y-%m-%d %H:%M")
        );
    }
}
