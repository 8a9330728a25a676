//! `avail` CLI — query booking availability rules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Is the shop bookable on a date?
//! avail check -r rules.json --date 2024-01-08
//!
//! # At a time, and for a duration (minutes)
//! avail check -r rules.json --date 2024-01-08 --time 10:00 --duration 45
//!
//! # Override the document's buffer offset
//! avail check -r rules.json --date 2024-01-08 --time 16:45 --offset 30
//!
//! # Weekly opening windows as JSON (reads the rules from stdin)
//! cat rules.json | avail week
//!
//! # Earliest opening and latest closing time
//! avail span -r rules.json
//! ```
//!
//! Set `RUST_LOG=availability_engine=debug` to see how each date resolves.

use anyhow::{Context, Result};
use availability_engine::{AvailabilityResolver, RulesDocument, TimeOfDay};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "avail",
    version,
    about = "Query booking availability rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a date, time, or booking is allowed
    Check {
        /// Rules document (reads from stdin if omitted or "-")
        #[arg(short, long)]
        rules: Option<String>,
        /// Calendar date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Clock time, HH:MM (24:00 allowed)
        #[arg(long)]
        time: Option<TimeOfDay>,
        /// Booking length in minutes (requires --time)
        #[arg(long, requires = "time")]
        duration: Option<u32>,
        /// Buffer offset in minutes, overriding the document
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Print merged opening windows per weekday as JSON (0 = Monday)
    Week {
        /// Rules document (reads from stdin if omitted or "-")
        #[arg(short, long)]
        rules: Option<String>,
        /// Buffer offset in minutes, overriding the document
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Print the earliest opening and latest closing time across all rules
    Span {
        /// Rules document (reads from stdin if omitted or "-")
        #[arg(short, long)]
        rules: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            rules,
            date,
            time,
            duration,
            offset,
        } => {
            let resolver = load_resolver(rules.as_deref(), offset)?;
            let valid = match (time, duration) {
                (Some(time), Some(minutes)) => {
                    resolver.is_valid_date_time_duration(date, time, minutes)
                }
                (Some(time), None) => resolver.is_valid_date_time(date, time),
                (None, _) => resolver.is_valid_date(date),
            };
            println!("{}", if valid { "valid" } else { "invalid" });
        }
        Commands::Week { rules, offset } => {
            let resolver = load_resolver(rules.as_deref(), offset)?;
            let pretty = serde_json::to_string_pretty(resolver.weekly_ranges())
                .context("Failed to serialize weekly ranges")?;
            println!("{}", pretty);
        }
        Commands::Span { rules } => {
            let resolver = load_resolver(rules.as_deref(), None)?;
            match resolver.time_span() {
                Some((earliest, latest)) => println!("{}-{}", earliest, latest),
                None => println!("unrestricted"),
            }
        }
    }

    Ok(())
}

/// Build a resolver from a rules document, applying an optional offset
/// override.
fn load_resolver(path: Option<&str>, offset: Option<u32>) -> Result<AvailabilityResolver> {
    let json = read_input(path)?;
    let document = RulesDocument::from_json(&json).context("Failed to parse rules document")?;
    let mut resolver =
        AvailabilityResolver::from_document(&document).context("Invalid availability rules")?;
    if let Some(minutes) = offset {
        resolver.set_offset(minutes);
    }
    info!(
        rules = resolver.rules().len(),
        offset_minutes = resolver.offset(),
        "loaded availability rules"
    );
    Ok(resolver)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
