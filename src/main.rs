//! # Remindust
//!
//! A terminal reminder manager. Remindust combines a fast CLI for quick entry
//! with a TUI dashboard that cycles through your views.
//!
//! ## Features
//!
//! *   **Recurring reminders**: daily, weekly, monthly, yearly, or custom
//!     weekdays, with an optional end date. Each occurrence can be completed
//!     on its own.
//! *   **Views**: today, this week, this month, works, shopping, outstanding
//!     (yearly) and a dashboard with birthdays and important events.
//! *   **Habits**: tick off days and keep a streak.
//! *   **Vault**: a few labelled personal values (licence id, membership no).
//! *   **Data Persistence**: stored as JSON in the XDG data directory.
//!
//! ## Usage
//!
//! ```bash
//! # Dashboard carousel
//! remindust
//!
//! # One-off reminder
//! remindust add "Dentist" --due 2025-03-14T10:30 --category health --priority high
//!
//! # Gym on Mon/Wed/Fri until summer
//! remindust add "Gym" --due 2025-01-06T07:00 --recur custom --days 1,3,5 --until 2025-06-30
//!
//! # What's on this week
//! remindust list week
//!
//! # Complete one occurrence (ids come from `list`)
//! remindust complete 4::1736146800000
//! ```
//!
//! ## Data Storage
//!
//! Reminders are saved in your local data directory:
//! *   Linux: `~/.local/share/remindust/reminders.json`
//! *   macOS: `~/Library/Application Support/remindust/reminders.json`
//! *   Windows: `%APPDATA%\remindust\reminders.json`
//!
//! Override this with the `REMINDERS_DB` environment variable. Habits and
//! vault fields live next to it. Set `RUST_LOG=debug` for diagnostics.

use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use remindust::commands::*;
use remindust::error::{Error, Result};
use remindust::models::{Priority, RecurrenceKind};
use remindust::storage::Store;
use remindust::tui::run_tui;
use remindust::views::View;

#[derive(Parser)]
#[command(name = "remindust")]
#[command(about = "Terminal reminders with recurring events and habits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new reminder
    Add {
        /// Reminder title (quoted if it has spaces)
        title: String,
        /// Due date: YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339
        #[arg(short, long)]
        due: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// List the reminders of a view
    List {
        #[arg(value_enum, default_value = "today")]
        view: View,
    },
    /// Complete a reminder or a single occurrence
    Complete {
        /// Reminder id, or occurrence id as shown by `list`
        id: String,
    },
    /// Remove a reminder (an occurrence id removes the whole series)
    Remove {
        id: String,
    },
    /// Edit a reminder
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New due date
        #[arg(short, long)]
        due: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show dashboard counters, birthdays and important events
    Stats,
    /// Manage habits
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Manage vault fields
    Vault {
        #[command(subcommand)]
        command: VaultCommands,
    },
    /// Reset the database (delete all reminders, habits and vault fields)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(clap::Args)]
struct FieldArgs {
    /// Longer description
    #[arg(long)]
    description: Option<String>,
    /// Category, e.g. work, shopping, birthday, event
    #[arg(short, long)]
    category: Option<String>,
    /// Priority (low, medium, high)
    #[arg(short, long)]
    priority: Option<Priority>,
    /// Cost, for shopping items
    #[arg(long)]
    cost: Option<f64>,
    /// Recurrence (none, daily, weekly, monthly, yearly, custom)
    #[arg(short, long)]
    recur: Option<RecurrenceKind>,
    /// Weekdays for custom recurrence, 0=Sunday..6=Saturday, e.g. 1,3,5
    #[arg(long, value_delimiter = ',')]
    days: Vec<u8>,
    /// Last day the reminder repeats
    #[arg(short, long)]
    until: Option<String>,
}

impl FieldArgs {
    fn into_draft(self, title: Option<String>, due: Option<String>) -> ReminderDraft {
        ReminderDraft {
            title,
            description: self.description,
            due,
            category: self.category,
            priority: self.priority,
            cost: self.cost,
            recur: self.recur,
            days: self.days,
            until: self.until,
        }
    }
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Add a new habit
    Add {
        title: String,
    },
    /// List habits with a grid of recent days
    List {
        /// Days to show (28 gives the month grid)
        #[arg(short, long, default_value_t = HABIT_WEEK)]
        days: usize,
    },
    /// Mark a day done, or undo it
    Toggle {
        id: String,
        /// Day to toggle (defaults to today)
        #[arg(short, long)]
        day: Option<String>,
    },
    /// Remove a habit
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
enum VaultCommands {
    /// List vault fields
    List,
    /// Add a vault field
    Add {
        label: String,
        #[arg(short, long)]
        value: Option<String>,
    },
    /// Change a vault field
    Set {
        id: String,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(short, long)]
        value: Option<String>,
    },
    /// Remove a vault field
    Remove {
        id: String,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(command: Commands, store: &Store) -> Result<()> {
    match command {
        Commands::Add { title, due, fields } => cmd_add(store, title, &due, fields.into_draft(None, None), false).map(|_| ()),
        Commands::List { view } => cmd_list(store, view),
        Commands::Complete { id } => cmd_complete(store, &id, false),
        Commands::Remove { id } => cmd_remove(store, &id, false),
        Commands::Edit { id, title, due, fields } => cmd_edit(store, &id, fields.into_draft(title, due), false),
        Commands::Stats => cmd_stats(store),
        Commands::Habit { command } => match command {
            HabitCommands::Add { title } => cmd_habit_add(store, title, false).map(|_| ()),
            HabitCommands::List { days } => cmd_habit_list(store, days),
            HabitCommands::Toggle { id, day } => cmd_habit_toggle(store, &id, day.as_deref(), false).map(|_| ()),
            HabitCommands::Remove { id } => cmd_habit_remove(store, &id, false),
        },
        Commands::Vault { command } => match command {
            VaultCommands::List => cmd_vault_list(store),
            VaultCommands::Add { label, value } => cmd_vault_add(store, label, value, false).map(|_| ()),
            VaultCommands::Set { id, label, value } => cmd_vault_set(store, &id, label, value, false),
            VaultCommands::Remove { id } => cmd_vault_remove(store, &id, false),
        },
        Commands::Reset { force } => cmd_reset(store, force),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "remindust", &mut io::stdout());
            Ok(())
        }
        Commands::Ui => run_tui(store.clone()),
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    // The TUI owns the terminal; log lines would tear its frames.
    if !matches!(command, Commands::Ui) {
        init_logging();
    }

    let result = Store::open_default().and_then(|store| run(command, &store));
    match result {
        Ok(()) => {}
        Err(Error::Aborted) => println!("Aborted."),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
