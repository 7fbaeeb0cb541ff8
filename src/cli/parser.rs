use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for recwatch
/// Recording-check scheduling and reminders for room events
#[derive(Parser)]
#[command(
    name = "recwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track recording checks for room events: schedules, owners, completions and reminders",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Inspect the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their default values")]
        migrate: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Load events and shift blocks from a YAML or JSON snapshot
    Import {
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Show the check timeline of an event
    Timeline {
        event_id: i64,

        #[arg(long, value_name = "DATETIME", help = "Evaluate at YYYY-MM-DD HH:MM instead of the clock")]
        now: Option<String>,

        #[arg(long, help = "Print the timeline as JSON")]
        json: bool,
    },

    /// Show who owns an event over time
    Owners {
        event_id: i64,

        #[arg(long, help = "Print the timeline as JSON")]
        json: bool,
    },

    /// Confirm that a recording check was done
    Complete {
        event_id: i64,

        /// 1-based check number
        index: u32,

        #[arg(long, short, help = "Staff id (defaults to `user` in the config)")]
        user: Option<String>,

        #[arg(long, value_name = "DATETIME")]
        now: Option<String>,
    },

    /// Mark elapsed, unconfirmed checks as missed
    Sweep {
        #[arg(long, value_name = "DATETIME")]
        now: Option<String>,
    },

    /// Watch for due checks and deliver reminders
    Watch {
        #[arg(long, short, help = "Staff id (defaults to `user` in the config)")]
        user: Option<String>,

        #[arg(long, help = "Stop after N watchdog ticks")]
        ticks: Option<u64>,

        #[arg(long, help = "Also send desktop notifications")]
        native: bool,

        #[arg(long, value_name = "DATETIME", help = "Pin the clock (for dry runs)")]
        now: Option<String>,
    },

    /// List in-app notifications
    Notifications {
        #[arg(long, short)]
        user: Option<String>,

        #[arg(long, help = "Only unread notifications")]
        unread: bool,

        #[arg(long = "mark-read", help = "Mark the listed notifications as read")]
        mark_read: bool,
    },

    /// Export the check report
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,

        #[arg(long, value_name = "DATETIME")]
        now: Option<String>,
    },
}
