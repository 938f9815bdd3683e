//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `Backend` - Database or seeded demo store, chosen by `--demo`
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use dayboard_core::store::{MemoryStore, Repository};
use dayboard_core::tax_tables::{TaxTableProvider, TaxTables};
use dayboard_core::{db::Database, demo};
use tracing::info;

use super::today;
use crate::cli::Cli;

/// Where commands read and write their data
pub enum Backend {
    /// Seeded in-memory store; nothing is persisted
    Demo {
        store: MemoryStore,
        tables: TaxTables,
    },
    Db(Database),
}

impl Backend {
    /// In-memory backend seeded with demo data relative to `today`
    pub fn demo(tables: TaxTables, today: chrono::NaiveDate) -> Result<Self> {
        let store = MemoryStore::new();
        demo::seed(&store, today).context("Failed to seed demo data")?;
        Ok(Self::Demo { store, tables })
    }

    pub fn repo(&self) -> &dyn Repository {
        match self {
            Self::Demo { store, .. } => store,
            Self::Db(db) => db,
        }
    }

    pub fn tax_tables(&self) -> &dyn TaxTableProvider {
        match self {
            Self::Demo { tables, .. } => tables,
            Self::Db(db) => db,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo { .. })
    }

    /// Most recent year with a federal table
    pub fn latest_tax_year(&self) -> Result<Option<i32>> {
        Ok(match self {
            Self::Demo { tables, .. } => tables.latest_year(),
            Self::Db(db) => db.latest_tax_year()?,
        })
    }

    /// State codes with a table for `year`
    pub fn known_states(&self, year: i32) -> Result<Vec<String>> {
        Ok(match self {
            Self::Demo { tables, .. } => tables.states(year),
            Self::Db(db) => db.tax_states(year)?,
        })
    }

    /// Log a reminder when a write will not survive the process
    pub fn note_unsaved(&self) {
        if self.is_demo() {
            info!("Demo mode: changes are not saved");
        }
    }
}

/// Open the database, running migrations
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

fn load_tables(path: Option<&Path>) -> Result<TaxTables> {
    TaxTables::load(path).context("Failed to load tax tables")
}

/// Pick the backend for a command from the global flags
///
/// A database without tax tables gets the default (or `--tax-tables`) set
/// loaded on first use.
pub fn open_backend(cli: &Cli) -> Result<Backend> {
    let tables_path = cli.tax_tables.as_deref();

    if cli.demo {
        return Backend::demo(load_tables(tables_path)?, today());
    }

    let db = open_db(&cli.db)?;
    if tables_path.is_some() || !db.has_tax_tables()? {
        let tables = load_tables(tables_path)?;
        db.load_tax_tables(&tables)
            .context("Failed to store tax tables")?;
    }
    Ok(Backend::Db(db))
}

pub fn cmd_init(db_path: &Path, tables_path: Option<&Path>) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    let tables = load_tables(tables_path)?;
    let written = db
        .load_tax_tables(&tables)
        .context("Failed to store tax tables")?;
    let years: Vec<String> = tables.years().iter().map(|y| y.to_string()).collect();
    println!(
        "   Loaded {} tax tables (federal years: {})",
        written,
        years.join(", ")
    );
    match tables_path {
        Some(path) => println!("   Source: {}", path.display()),
        None => println!("   Source: built-in tables"),
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Set your pay: dayboard profile set --state IN --hourly 25 --hours-per-week 40");
    println!("  2. Estimate taxes: dayboard tax");
    println!("  3. Find subscriptions: dayboard detect --file transactions.csv --save");

    Ok(())
}
