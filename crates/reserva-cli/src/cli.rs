use clap::{Parser, Subcommand, ValueEnum};
use reserva_core::models::Frequency;

/// Conflict-aware appointment scheduling for services, staff and recurring
/// booking series
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage the service catalog
    Service(ServiceCommand),
    /// Manage staff members
    Staff(StaffCommand),
    /// Book an appointment, one-off or recurring
    Book(BookCommand),
    /// List bookings
    List(ListCommand),
    /// Confirm a pending booking
    Confirm(ConfirmCommand),
    /// Mark a booking as completed
    Complete(CompleteCommand),
    /// Cancel a booking
    Cancel(CancelCommand),
    /// Move a booking to a new time
    Reschedule(RescheduleCommand),
    /// Manage recurring booking series
    Recur(RecurCommand),
    /// Materialize upcoming occurrences of active series into bookings
    Materialize(MaterializeCommand),
    /// Reminder lookahead queries
    Remind(RemindCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct ServiceCommand {
    #[command(subcommand)]
    pub command: ServiceSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ServiceSubcommand {
    /// Add a new service
    Add(AddServiceCommand),
    /// List services
    List,
    /// Stop offering a service
    Deactivate(DeactivateCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddServiceCommand {
    /// The name of the service
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Session length in minutes
    #[arg(long, default_value = "60")]
    pub duration: i64,

    /// Price in cents
    #[arg(long, default_value = "0")]
    pub price: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct DeactivateCommand {
    /// Name (or unambiguous prefix) of the entry to deactivate
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct StaffCommand {
    #[command(subcommand)]
    pub command: StaffSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum StaffSubcommand {
    /// Add a staff member
    Add(AddStaffCommand),
    /// List staff members
    List,
    /// Stop taking bookings for a staff member
    Deactivate(DeactivateCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddStaffCommand {
    /// The staff member's name
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// IANA timezone (defaults to the system timezone)
    #[arg(long)]
    pub timezone: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct BookCommand {
    /// Service name (or unambiguous prefix)
    #[arg(long)]
    pub service: String,

    /// Staff member name (or unambiguous prefix)
    #[arg(long)]
    pub staff: String,

    /// Client's name
    #[arg(long)]
    pub client: String,

    /// Client's email address
    #[arg(long)]
    pub email: String,

    /// When the (first) session starts, e.g. "2025-11-04 14:00" or "next tuesday 2pm"
    #[arg(long)]
    pub at: String,

    /// Free-form note attached to the booking
    #[arg(long)]
    pub notes: Option<String>,

    /// Make this a recurring series with the given cadence
    #[arg(long, value_enum)]
    pub every: Option<CadenceArg>,

    /// Weekday for weekly/biweekly series (defaults to the start date's weekday)
    #[arg(long, help = "Weekday (sun, mon, ..., sat)")]
    pub on: Option<String>,

    /// Day of month for monthly series (defaults to the start date's day)
    #[arg(long)]
    pub day: Option<i64>,

    /// Cadence multiplier: every N weeks/months
    #[arg(long)]
    pub interval: Option<i64>,

    /// Last date a session may fall on
    #[arg(long)]
    pub until: Option<String>,

    /// Maximum number of sessions in the series
    #[arg(long)]
    pub count: Option<i64>,

    /// Timezone the series is anchored in (IANA format)
    #[arg(long)]
    pub timezone: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only bookings for this staff member
    #[arg(long)]
    pub staff: Option<String>,

    /// Only bookings with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Only bookings starting on or after this time
    #[arg(long)]
    pub from: Option<String>,

    /// Only bookings starting on or before this time
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfirmCommand {
    /// The ID of the booking to confirm
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompleteCommand {
    /// The ID of the booking to mark completed
    pub id: String,

    /// Record the client as a no-show instead
    #[arg(long)]
    pub no_show: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CancelCommand {
    /// The ID of the booking to cancel
    pub id: String,

    /// Cancel without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RescheduleCommand {
    /// The ID of the booking to move
    pub id: String,

    /// New start time
    #[arg(long)]
    pub to: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurCommand {
    #[command(subcommand)]
    pub command: RecurSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecurSubcommand {
    /// Show series information
    Info(RecurIdCommand),
    /// Show the next occurrences of a series
    Preview(RecurPreviewCommand),
    /// Pause a series (stop materializing new bookings)
    Pause(RecurIdCommand),
    /// Resume a paused series
    Resume(RecurIdCommand),
    /// Cancel a series
    Cancel(RecurIdCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct RecurIdCommand {
    /// Series ID
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurPreviewCommand {
    /// Series ID
    pub id: String,

    /// Number of occurrences to show
    #[arg(long, short, default_value = "10")]
    pub count: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct MaterializeCommand {
    /// Materialize a single series instead of all active ones
    #[arg(long)]
    pub series: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RemindCommand {
    #[command(subcommand)]
    pub command: RemindSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RemindSubcommand {
    /// List bookings entering a reminder window
    Due(RemindDueCommand),
    /// Flag a booking's reminder as sent
    Mark(RemindMarkCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct RemindDueCommand {
    /// Restrict to one window (day or hour)
    #[arg(long, value_enum)]
    pub window: Option<WindowArg>,
}

#[derive(Parser, Debug, Clone)]
pub struct RemindMarkCommand {
    /// The ID of the booking
    pub id: String,

    /// Which reminder was sent
    #[arg(long, value_enum)]
    pub window: WindowArg,
}

/// Series cadence accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceArg {
    /// Every week (or every N weeks with --interval)
    Weekly,
    /// Every two weeks
    Biweekly,
    /// Every month (or every N months with --interval)
    Monthly,
}

impl CadenceArg {
    pub fn to_frequency(self) -> Frequency {
        match self {
            CadenceArg::Weekly => Frequency::Weekly,
            CadenceArg::Biweekly => Frequency::Biweekly,
            CadenceArg::Monthly => Frequency::Monthly,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowArg {
    /// ~24 hours ahead
    Day,
    /// ~1 hour ahead
    Hour,
}

impl WindowArg {
    pub fn to_window(self) -> reserva_core::models::ReminderWindow {
        match self {
            WindowArg::Day => reserva_core::models::ReminderWindow::DayBefore,
            WindowArg::Hour => reserva_core::models::ReminderWindow::HourBefore,
        }
    }
}
