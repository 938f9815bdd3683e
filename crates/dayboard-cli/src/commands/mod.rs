//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Backend selection (database or demo store) and `init`
//! - `tax` - Tax estimation, state and housing comparison
//! - `detect` - Recurring charge detection from transaction files
//! - `subscriptions` - Subscription management commands
//! - `profile` - Profile commands
//! - `daily` - Commute estimates and the daily burn

pub mod core;
pub mod daily;
pub mod detect;
pub mod profile;
pub mod subscriptions;
pub mod tax;

// Re-export command functions for main.rs
pub use self::core::*;
pub use daily::*;
pub use detect::*;
pub use profile::*;
pub use subscriptions::*;
pub use tax::*;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format integer cents as dollars, e.g. `-$12.05`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Format basis points as a percentage, e.g. `9.30%`
pub fn format_bps(bps: i64) -> String {
    let sign = if bps < 0 { "-" } else { "" };
    let abs = bps.unsigned_abs();
    format!("{}{}.{:02}%", sign, abs / 100, abs % 100)
}

/// Parse a dollar amount argument into cents
pub fn parse_dollars_arg(name: &str, value: &str) -> Result<i64> {
    dayboard_core::import::parse_dollars(value)
        .with_context(|| format!("Invalid {} amount: {}", name, value))
}

/// Parse an optional YYYY-MM-DD argument
pub fn parse_date_arg(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid --{} format (use YYYY-MM-DD)", name))
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
