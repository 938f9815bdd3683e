//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `subscriptions` - Manual and detected subscriptions
//! - `profile` - The user profile and commute log
//! - `tax_tables` - Stored bracket tables (implements `TaxTableProvider`)

use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    CommuteEntry, NewCommuteEntry, NewSubscription, Profile, RecurringSubscription, Subscription,
    SubscriptionSource,
};
use crate::store::Repository;

mod profile;
mod subscriptions;
mod tax_tables;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Date format for DATE columns
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored DATE column
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Format a date for a DATE column
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Backed by a temp file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "dayboard_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Subscriptions (manual entries and detected recurring charges)
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY,
                merchant TEXT NOT NULL,
                merchant_key TEXT NOT NULL,                -- lowercased merchant, matched on re-detection
                amount_cents INTEGER NOT NULL,
                cadence_days INTEGER NOT NULL,
                next_due DATE,
                source TEXT NOT NULL DEFAULT 'manual',     -- manual, detected
                is_active BOOLEAN NOT NULL DEFAULT 1,
                frequency TEXT,                            -- detected only
                last_charge DATE,                          -- detected only
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_subscriptions_next_due ON subscriptions(next_due);
            CREATE INDEX IF NOT EXISTS idx_subscriptions_source ON subscriptions(source);
            CREATE INDEX IF NOT EXISTS idx_subscriptions_merchant_key ON subscriptions(merchant_key, amount_cents);

            -- Single-row user profile
            CREATE TABLE IF NOT EXISTS profile (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                home_addr TEXT NOT NULL DEFAULT '',
                office_addr TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT '',
                hourly_cents INTEGER,
                hours_per_week INTEGER,
                stipend_cents INTEGER,
                pay_freq TEXT NOT NULL DEFAULT 'biweekly',
                start_date DATE,
                in_office_days INTEGER NOT NULL DEFAULT 0,
                food_cost_cents INTEGER NOT NULL DEFAULT 0,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Commute log
            CREATE TABLE IF NOT EXISTS commutes (
                id INTEGER PRIMARY KEY,
                date DATE NOT NULL,
                from_addr TEXT NOT NULL,
                to_addr TEXT NOT NULL,
                cost_cents INTEGER NOT NULL CHECK (cost_cents >= 0),
                method TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_commutes_date ON commutes(date);

            -- Federal tax years and their standard deduction
            CREATE TABLE IF NOT EXISTS tax_years (
                year INTEGER PRIMARY KEY,
                standard_deduction_single_cents INTEGER NOT NULL
            );

            -- Federal brackets (single filer)
            CREATE TABLE IF NOT EXISTS tax_tables_federal (
                year INTEGER NOT NULL REFERENCES tax_years(year) ON DELETE CASCADE,
                low_cents INTEGER NOT NULL,
                high_cents INTEGER NOT NULL,              -- 0 = unbounded
                rate_bps INTEGER NOT NULL,
                PRIMARY KEY (year, low_cents)
            );

            -- Known state jurisdictions; a state with no bracket rows levies no income tax
            CREATE TABLE IF NOT EXISTS tax_states (
                year INTEGER NOT NULL,
                state TEXT NOT NULL,                       -- upper-case code
                PRIMARY KEY (year, state)
            );

            CREATE TABLE IF NOT EXISTS tax_tables_state (
                year INTEGER NOT NULL,
                state TEXT NOT NULL,
                low_cents INTEGER NOT NULL,
                high_cents INTEGER NOT NULL,
                rate_bps INTEGER NOT NULL,
                PRIMARY KEY (year, state, low_cents),
                FOREIGN KEY (year, state) REFERENCES tax_states(year, state) ON DELETE CASCADE
            );
            "#,
        )?;

        debug!("Database migrations complete for {}", self.db_path);
        Ok(())
    }
}

impl Repository for Database {
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        Database::list_active_subscriptions(self)
    }

    fn create_subscription(&self, new: NewSubscription) -> Result<Subscription> {
        self.insert_subscription(new, SubscriptionSource::Manual)
    }

    fn delete_subscription(&self, id: i64) -> Result<bool> {
        Database::delete_subscription(self, id)
    }

    fn upsert_detected(&self, detected: &[RecurringSubscription]) -> Result<usize> {
        Database::upsert_detected(self, detected)
    }

    fn get_profile(&self) -> Result<Option<Profile>> {
        Database::get_profile(self)
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        Database::upsert_profile(self, profile)
    }

    fn list_commutes(&self) -> Result<Vec<CommuteEntry>> {
        Database::list_commutes(self)
    }

    fn add_commute(&self, entry: NewCommuteEntry) -> Result<CommuteEntry> {
        Database::add_commute(self, entry)
    }
}
