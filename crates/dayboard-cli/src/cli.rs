//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// DayBoard - Know what your internship actually pays
#[derive(Parser)]
#[command(name = "dayboard")]
#[command(about = "Take-home pay, subscriptions and daily spend for interns", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "dayboard.db", global = true)]
    pub db: PathBuf,

    /// Use an in-memory store seeded with demo data instead of the database
    #[arg(long, global = true)]
    pub demo: bool,

    /// Tax bracket table file (TOML) to use instead of the defaults
    #[arg(long, global = true)]
    pub tax_tables: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and load tax tables
    Init,

    /// Estimate taxes and take-home pay
    Tax {
        #[command(flatten)]
        pay: PayArgs,

        /// Two-letter state code (defaults to the profile's state)
        #[arg(short, long)]
        state: Option<String>,

        /// Show how each bracket contributes
        #[arg(long)]
        breakdown: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare take-home pay across states
    CompareStates {
        #[command(flatten)]
        pay: PayArgs,

        /// States to compare (defaults to every state with a table)
        #[arg(value_delimiter = ',')]
        states: Vec<String>,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare take-home pay after rent across cities
    CompareHousing {
        #[command(flatten)]
        pay: PayArgs,

        /// Rent market file (defaults to the built-in markets)
        #[arg(long)]
        housing: Option<PathBuf>,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find recurring charges in a transaction export
    Detect {
        /// CSV or JSON transaction file (uses demo transactions with --demo)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Store detected subscriptions
        #[arg(long)]
        save: bool,

        /// Minimum charges before a pattern counts
        #[arg(long, default_value = "2")]
        min_occurrences: usize,

        /// Allowed drift, in days, from the average gap
        #[arg(long, default_value = "5")]
        tolerance: i64,

        /// Print detections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: Option<SubscriptionsAction>,
    },

    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Estimate (and optionally log) a ride-share commute
    Commute {
        /// Trip distance in miles
        #[arg(long)]
        miles: f64,

        /// Trip duration in minutes
        #[arg(long)]
        minutes: f64,

        /// Surge multiplier for the high estimate
        #[arg(long, default_value = "1.0")]
        surge: f64,

        /// Record the trip in the commute log
        #[arg(long)]
        log: bool,

        /// Actual fare in dollars (defaults to the low estimate)
        #[arg(long)]
        cost: Option<String>,

        /// Origin label for the log
        #[arg(long, default_value = "Home")]
        from: String,

        /// Destination label for the log
        #[arg(long, default_value = "Office")]
        to: String,

        /// How you got there
        #[arg(long, default_value = "Uber")]
        method: String,

        /// Trip date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show what a day costs: subscriptions due, commutes and food
    Burn {
        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Pay inputs shared by `tax` and `compare-states`
#[derive(clap::Args, Debug, Clone)]
pub struct PayArgs {
    /// Annual income in dollars (defaults to the profile's pay)
    #[arg(short, long)]
    pub income: Option<String>,

    /// Filing status: single, married
    #[arg(long, default_value = "single")]
    pub filing_status: String,

    /// Pay frequency: weekly, biweekly, monthly
    #[arg(long)]
    pub pay_freq: Option<String>,

    /// Term length in weeks
    #[arg(long, default_value = "12")]
    pub term_weeks: u32,

    /// Tax year (defaults to the latest year with a table)
    #[arg(long)]
    pub year: Option<i32>,

    /// Fail on states with no tax table instead of assuming no state tax
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// List active subscriptions
    List,

    /// Add a subscription by hand
    Add {
        /// Merchant name
        merchant: String,

        /// Amount in dollars
        amount: String,

        /// Billing cadence in days
        #[arg(long, default_value = "30")]
        cadence_days: i64,

        /// Next due date (YYYY-MM-DD)
        #[arg(long)]
        next_due: Option<String>,
    },

    /// Delete a subscription
    Delete {
        /// Subscription ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the stored profile
    Show,

    /// Update profile fields (unset fields are kept)
    Set {
        #[arg(long)]
        home_addr: Option<String>,

        #[arg(long)]
        office_addr: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// Two-letter state code
        #[arg(long)]
        state: Option<String>,

        /// Hourly wage in dollars
        #[arg(long)]
        hourly: Option<String>,

        #[arg(long)]
        hours_per_week: Option<i64>,

        /// Term stipend in dollars (used when no hourly wage is set)
        #[arg(long)]
        stipend: Option<String>,

        /// Pay frequency: weekly, biweekly, monthly
        #[arg(long)]
        pay_freq: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        #[arg(long)]
        in_office_days: Option<i64>,

        /// Daily food budget in dollars
        #[arg(long)]
        food: Option<String>,
    },
}
