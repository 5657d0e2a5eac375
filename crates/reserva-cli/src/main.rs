use clap::Parser;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use reserva_core::db;
use reserva_core::error::CoreError;
use reserva_core::repository::{BookingRepository, SqliteRepository};
use util::resolve_booking_id;

mod cli;
mod commands;
mod config;
mod parser;
mod timezone;
mod util;
mod views;

const DEFAULT_DATABASE_PATH: &str = "reserva.db";

#[tokio::main]
async fn main() {
    let config = config::Config::new().unwrap_or_default();

    let db_path = std::env::var("RESERVA_DATABASE_PATH")
        .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
    let db_pool = match db::establish_connection(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let repository = SqliteRepository::new(db_pool, config.materialization.to_policy());

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Service(command) => {
            commands::service::service_command(&repository, command).await
        }
        cli::Commands::Staff(command) => commands::staff::staff_command(&repository, command).await,
        cli::Commands::Book(command) => commands::book::book(&repository, command, &config).await,
        cli::Commands::List(command) => commands::list::list_bookings(&repository, command).await,
        cli::Commands::Confirm(command) => {
            commands::status::confirm_booking(&repository, command).await
        }
        cli::Commands::Complete(command) => {
            commands::status::complete_booking(&repository, command).await
        }
        cli::Commands::Cancel(command) => {
            let booking_id = match resolve_booking_id(&repository, &command.id).await {
                Ok(id) => id,
                Err(e) => {
                    handle_error(e);
                    return;
                }
            };
            let booking = match repository.find_booking_by_id(booking_id).await {
                Ok(Some(b)) => b,
                Ok(None) => {
                    let error_style = Style::new().red().bold();
                    eprintln!(
                        "{} Booking with ID '{}' not found.",
                        "Error:".style(error_style),
                        booking_id
                    );
                    return;
                }
                Err(e) => {
                    handle_error(e.into());
                    return;
                }
            };

            if !command.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Cancel {}'s booking on {}?",
                        booking.client_name,
                        booking.start_at.format("%Y-%m-%d %H:%M")
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Cancellation aborted.");
                    return;
                }
            }
            commands::status::cancel_booking(&repository, booking_id).await
        }
        cli::Commands::Reschedule(command) => {
            commands::reschedule::reschedule(&repository, command).await
        }
        cli::Commands::Recur(command) => {
            commands::recurrence::recur_command(&repository, command, &config).await
        }
        cli::Commands::Materialize(command) => {
            commands::materialize::materialize(&repository, command).await
        }
        cli::Commands::Remind(command) => {
            commands::remind::remind_command(&repository, command).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    let core_error = err
        .downcast_ref::<CoreError>()
        .or_else(|| err.source().and_then(|e| e.downcast_ref::<CoreError>()));

    if let Some(core_error) = core_error {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::SlotConflict {
                start_at, end_at, ..
            } => {
                eprintln!(
                    "{} That slot is already booked ({} .. {}).",
                    "Error:".style(error_style),
                    start_at.format("%Y-%m-%d %H:%M").to_string().yellow(),
                    end_at.format("%H:%M").to_string().yellow()
                );
                eprintln!("Try another time, or list the provider's calendar with: reserva list --staff <name>");
            }
            CoreError::AmbiguousId(candidates) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, description) in candidates {
                    eprintln!("  {} ({})", id.yellow(), description);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidPattern(s) => {
                eprintln!(
                    "{} Invalid recurrence pattern: {}",
                    "Error:".style(error_style),
                    s
                );
            }
            CoreError::InvalidTimezone(tz) => {
                eprintln!(
                    "{} Invalid timezone: {}. Use IANA names like 'America/New_York'.",
                    "Error:".style(error_style),
                    tz.yellow()
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
