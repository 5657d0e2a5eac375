use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use reserva_core::models::{BookingStatus, PatternStatus, RecurrencePattern, Service, Staff};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ViewBooking {
    pub id: Uuid,
    pub client_name: String,
    pub service_name: String,
    pub staff_name: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub recurring: bool,
}

fn short(id: &Uuid) -> String {
    id.simple().to_string()[..7].to_string()
}

pub fn display_bookings(bookings: &[ViewBooking]) {
    if bookings.is_empty() {
        println!("No bookings found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "When", "Client", "Service", "Staff", "Status"]);

    for booking in bookings {
        let mut row = Row::new();
        row.add_cell(Cell::new(short(&booking.id)));

        let when = format!(
            "{} - {} ({})",
            booking.start_at.format("%Y-%m-%d %H:%M"),
            booking.end_at.format("%H:%M"),
            booking.start_at.humanize()
        );
        row.add_cell(Cell::new(when));

        let mut client = String::new();
        if booking.recurring {
            client.push('↻'); // Recurring series member
            client.push(' ');
        }
        client.push_str(&booking.client_name);
        row.add_cell(Cell::new(client));

        row.add_cell(Cell::new(&booking.service_name));
        row.add_cell(Cell::new(&booking.staff_name));

        let status_cell = match booking.status {
            BookingStatus::Confirmed => Cell::new("confirmed").fg(Color::Green),
            BookingStatus::Pending => Cell::new("pending").fg(Color::Yellow),
            BookingStatus::Rescheduled => Cell::new("rescheduled").fg(Color::Cyan),
            BookingStatus::Completed => Cell::new("completed")
                .fg(Color::DarkGrey)
                .add_attribute(Attribute::CrossedOut),
            BookingStatus::Cancelled => Cell::new("cancelled")
                .fg(Color::DarkGrey)
                .add_attribute(Attribute::CrossedOut),
            BookingStatus::NoShow => Cell::new("no-show").fg(Color::Red),
        };
        row.add_cell(status_cell);

        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_services(services: &[Service]) {
    if services.is_empty() {
        println!("No services found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Duration", "Price", "Active"]);

    for service in services {
        let mut row = Row::new();
        row.add_cell(Cell::new(short(&service.id)));

        let mut name_cell = Cell::new(&service.name);
        if !service.active {
            name_cell = name_cell
                .fg(Color::DarkGrey)
                .add_attribute(Attribute::CrossedOut);
        }
        row.add_cell(name_cell);
        row.add_cell(Cell::new(format!("{} min", service.duration_minutes)));
        row.add_cell(Cell::new(format!(
            "{:.2}",
            service.price_cents as f64 / 100.0
        )));
        row.add_cell(Cell::new(if service.active { "yes" } else { "no" }));

        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_staff(staff: &[Staff]) {
    if staff.is_empty() {
        println!("No staff found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Email", "Timezone", "Active"]);

    for member in staff {
        let mut row = Row::new();
        row.add_cell(Cell::new(short(&member.id)));

        let mut name_cell = Cell::new(&member.name);
        if !member.active {
            name_cell = name_cell
                .fg(Color::DarkGrey)
                .add_attribute(Attribute::CrossedOut);
        }
        row.add_cell(name_cell);
        row.add_cell(Cell::new(&member.email));
        row.add_cell(Cell::new(&member.time_zone));
        row.add_cell(Cell::new(if member.active { "yes" } else { "no" }));

        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_patterns(patterns: &[RecurrencePattern]) {
    if patterns.is_empty() {
        println!("No series found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Client", "Cadence", "At", "Timezone", "Sessions", "Status",
    ]);

    for pattern in patterns {
        let mut row = Row::new();
        row.add_cell(Cell::new(short(&pattern.id)));
        row.add_cell(Cell::new(&pattern.client_name));

        let cadence = if pattern.interval > 1 {
            format!("every {} {}", pattern.interval, match pattern.frequency {
                reserva_core::models::Frequency::Weekly => "weeks",
                reserva_core::models::Frequency::Biweekly => "fortnights",
                reserva_core::models::Frequency::Monthly => "months",
            })
        } else {
            pattern.frequency.to_string()
        };
        row.add_cell(Cell::new(cadence));
        row.add_cell(Cell::new(&pattern.start_time));
        row.add_cell(Cell::new(&pattern.time_zone));

        let sessions = match pattern.occurrences {
            Some(cap) => format!("{}/{}", pattern.generated_count(), cap),
            None => pattern.generated_count().to_string(),
        };
        row.add_cell(Cell::new(sessions));

        let status_cell = match pattern.status {
            PatternStatus::Active => Cell::new("active").fg(Color::Green),
            PatternStatus::Paused => Cell::new("paused").fg(Color::Yellow),
            PatternStatus::Completed => Cell::new("completed").fg(Color::DarkGrey),
            PatternStatus::Cancelled => Cell::new("cancelled")
                .fg(Color::DarkGrey)
                .add_attribute(Attribute::CrossedOut),
        };
        row.add_cell(status_cell);

        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(dates: &[DateTime<Utc>], time_zone: &str) {
    if dates.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date (UTC)", "Local", "Relative"]);

    for (index, date) in dates.iter().enumerate() {
        let local = reserva_core::timezone::format_in_zone(*date, time_zone, "%Y-%m-%d %H:%M")
            .unwrap_or_else(|_| "-".to_string());
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(date.format("%Y-%m-%d %H:%M")),
            Cell::new(local),
            Cell::new(date.humanize()),
        ]);
    }

    println!("{table}");
}
