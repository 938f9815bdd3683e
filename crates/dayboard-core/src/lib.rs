//! DayBoard Core Library
//!
//! Personal finance calculations for the DayBoard dashboard:
//! - Progressive income tax estimation from bracket tables
//! - Recurring charge (subscription) detection from transaction history
//! - Bracket table providers (embedded TOML, SQLite)
//! - Subscription, profile and commute storage
//! - Transaction import, commute cost and daily burn
//! - Net pay after rent across cities

pub mod budget;
pub mod commute;
pub mod db;
pub mod demo;
pub mod detect;
pub mod error;
pub mod housing;
pub mod import;
pub mod models;
pub mod store;
pub mod tax;
pub mod tax_tables;

pub use budget::{daily_burn, DailyBurn};
pub use commute::{CommuteCostModel, CommuteEstimate};
pub use db::Database;
pub use detect::{detect_recurring, detect_recurring_with, DetectionConfig};
pub use error::{Error, Result};
pub use housing::{HousingComparison, RentMarket};
pub use store::{MemoryStore, Repository};
pub use tax::{estimate_taxes, StateComparison, TaxEstimator, TaxEstimatorConfig};
pub use tax_tables::{BracketTable, FederalTable, TaxTableProvider, TaxTables};
