use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

use crate::error::{DashboardError, Result};
use crate::time_utils::parse_range_bound;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Explore a retail transactions CSV in the terminal
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-dashboard",
    about = "Explore a retail transactions CSV in the terminal",
    version
)]
pub struct Settings {
    /// Transactions CSV file (latin-1 encoded)
    pub file: PathBuf,

    /// Keep invoices on or after this date / date-time
    #[arg(long)]
    pub from: Option<String>,

    /// Keep invoices on or before this date / date-time (a bare date keeps the whole day)
    #[arg(long)]
    pub to: Option<String>,

    /// Dashboard section to open
    #[arg(long, default_value = "overview", value_parser = ["overview", "products", "customers", "time", "download"])]
    pub section: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Output format
    #[arg(long, default_value = "tui", value_parser = ["tui", "json"])]
    pub format: String,

    /// Write the filtered table to this .xlsx file and exit
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Drop rows whose InvoiceDate cannot be parsed instead of failing the load
    #[arg(long)]
    pub skip_bad_dates: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Parse an explicit argument list, applying `--debug`.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::apply_debug(Settings::parse_from(args))
    }

    /// Parsed `--from` / `--to` bounds.
    ///
    /// Fails with a configuration error when a bound cannot be parsed or the
    /// range is inverted.
    pub fn range_bounds(&self) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>)> {
        let start = parse_bound(self.from.as_deref(), false, "--from")?;
        let end = parse_bound(self.to.as_deref(), true, "--to")?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(DashboardError::Config(format!(
                    "--from ({}) is after --to ({})",
                    s, e
                )));
            }
        }
        Ok((start, end))
    }

    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

fn parse_bound(raw: Option<&str>, is_end: bool, flag: &str) -> Result<Option<NaiveDateTime>> {
    raw.map(|s| {
        parse_range_bound(s, is_end)
            .ok_or_else(|| DashboardError::Config(format!("{} is not a valid date: {:?}", flag, s)))
    })
    .transpose()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
