use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use reserva_core::models::NewServiceData;
use reserva_core::repository::Repository;

use crate::cli::{AddServiceCommand, DeactivateCommand, ServiceCommand, ServiceSubcommand};
use crate::util::resolve_service;
use crate::views::table::display_services;

pub async fn service_command(repo: &impl Repository, command: ServiceCommand) -> Result<()> {
    match command.command {
        ServiceSubcommand::Add(add) => add_service(repo, add).await,
        ServiceSubcommand::List => list_services(repo).await,
        ServiceSubcommand::Deactivate(deactivate) => deactivate_service(repo, deactivate).await,
    }
}

async fn add_service(repo: &impl Repository, command: AddServiceCommand) -> Result<()> {
    let service = repo
        .add_service(NewServiceData {
            name: command.name,
            description: command.description,
            duration_minutes: command.duration,
            price_cents: command.price,
        })
        .await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Added service: {} ({} min)",
        "✓".style(success_style),
        service.name.bright_white().bold(),
        service.duration_minutes
    );
    Ok(())
}

async fn list_services(repo: &impl Repository) -> Result<()> {
    let services = repo.find_services().await?;
    display_services(&services);
    Ok(())
}

async fn deactivate_service(repo: &impl Repository, command: DeactivateCommand) -> Result<()> {
    let service = resolve_service(repo, &command.name).await?;
    repo.deactivate_service(service.id).await?;
    println!("Service '{}' is no longer offered.", service.name);
    Ok(())
}
