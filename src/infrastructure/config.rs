//! Command-line configuration.

use std::path::PathBuf;

use chrono::FixedOffset;
use clap::Parser;
use log::LevelFilter;
use thiserror::Error;

use crate::domain::{Currency, DEFAULT_ROW_COUNT, FormatSettings, Locale};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid UTC offset '{0}', expected something like +09:00")]
    InvalidUtcOffset(String),
    #[error("Could not open log file: {0}")]
    LogFile(#[from] std::io::Error),
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Parser)]
#[command(name = "rowgrid")]
#[command(about = "Editable data grid in the terminal", long_about = None)]
pub struct Cli {
    /// Number of sample rows to generate
    #[arg(long, default_value_t = DEFAULT_ROW_COUNT)]
    pub rows: usize,

    /// Locale used by the date, date-time and currency formatters (ja-jp, en-us)
    #[arg(long, default_value = "ja-jp")]
    pub locale: Locale,

    /// Currency for the price column (jpy, usd)
    #[arg(long, default_value = "jpy")]
    pub currency: Currency,

    /// Time zone offset for dates and date-times
    #[arg(long, default_value = "+09:00", allow_hyphen_values = true)]
    pub utc_offset: String,

    /// JSON rows file to open instead of the sample rows
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Where log output goes; the terminal belongs to the grid
    #[arg(long, default_value = "rowgrid.log")]
    pub log_file: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

/// Validated settings the application starts with.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub row_count: usize,
    pub settings: FormatSettings,
    pub load: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl TryFrom<Cli> for AppConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> ConfigResult<Self> {
        let utc_offset = parse_utc_offset(&cli.utc_offset)?;
        Ok(Self {
            row_count: cli.rows,
            settings: FormatSettings {
                locale: cli.locale,
                currency: cli.currency,
                utc_offset,
            },
            load: cli.load,
            log_file: cli.log_file,
            log_level: cli.log_level,
        })
    }
}

/// Parses `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`.
pub fn parse_utc_offset(text: &str) -> ConfigResult<FixedOffset> {
    let invalid = || ConfigError::InvalidUtcOffset(text.to_string());
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
