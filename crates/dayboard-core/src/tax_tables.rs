//! Bracket tables and the providers that serve them
//!
//! The estimator never fetches brackets itself; it is handed a
//! [`TaxTableProvider`]. Two providers exist:
//! - [`TaxTables`], parsed from TOML (embedded default or an override file)
//! - [`crate::db::Database`], backed by the `tax_tables_*` SQLite tables
//!
//! ## Configuration Resolution
//!
//! Tables are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/dayboard/config/tax_tables.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Bracket;

/// Embedded default tables (compiled into binary)
const DEFAULT_TABLES: &str = include_str!("../../../config/tax_tables.toml");

/// Highest accepted marginal rate (100%)
const MAX_RATE_BPS: i64 = 10_000;

/// A validated, ascending bracket sequence covering `[0, ∞)`
///
/// An empty table is valid and means the jurisdiction levies no income tax.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Sort and validate brackets
    pub fn new(mut brackets: Vec<Bracket>) -> Result<Self> {
        brackets.sort_by_key(|b| b.low_cents);

        let Some(first) = brackets.first() else {
            return Ok(Self { brackets });
        };
        if first.low_cents != 0 {
            return Err(Error::InvalidTable(format!(
                "first bracket must start at 0, starts at {}",
                first.low_cents
            )));
        }

        let last_index = brackets.len() - 1;
        for (i, bracket) in brackets.iter().enumerate() {
            if bracket.low_cents < 0 || bracket.high_cents < 0 {
                return Err(Error::InvalidTable(format!(
                    "negative bound in bracket {}",
                    i
                )));
            }
            if !(0..=MAX_RATE_BPS).contains(&bracket.rate_bps) {
                return Err(Error::InvalidTable(format!(
                    "rate {} bps out of range in bracket {}",
                    bracket.rate_bps, i
                )));
            }

            if i == last_index {
                if !bracket.is_unbounded() {
                    return Err(Error::InvalidTable(
                        "last bracket must be unbounded (high_cents = 0)".into(),
                    ));
                }
                continue;
            }

            if bracket.is_unbounded() {
                return Err(Error::InvalidTable(format!(
                    "unbounded bracket {} is not the last bracket",
                    i
                )));
            }
            if bracket.high_cents <= bracket.low_cents {
                return Err(Error::InvalidTable(format!(
                    "bracket {} has an empty range {}..{}",
                    i, bracket.low_cents, bracket.high_cents
                )));
            }

            let next = &brackets[i + 1];
            if next.low_cents != bracket.high_cents {
                return Err(Error::InvalidTable(format!(
                    "brackets {} and {} are not contiguous ({} vs {})",
                    i,
                    i + 1,
                    bracket.high_cents,
                    next.low_cents
                )));
            }
        }

        Ok(Self { brackets })
    }

    /// Table with a single unbounded bracket at a flat rate
    pub fn flat(rate_bps: i64) -> Result<Self> {
        Self::new(vec![Bracket::unbounded(0, rate_bps)])
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}

/// Federal brackets plus the standard deduction for a tax year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederalTable {
    pub brackets: BracketTable,
    pub standard_deduction_single_cents: i64,
}

/// Source of bracket tables keyed by tax year and jurisdiction
pub trait TaxTableProvider {
    /// Federal table for a year, `None` if the year is unknown
    fn federal(&self, year: i32) -> Result<Option<FederalTable>>;

    /// State table for a year. `Some(empty)` is a known no-tax state,
    /// `None` means no data at all.
    fn state(&self, year: i32, state: &str) -> Result<Option<BracketTable>>;
}

impl<P: TaxTableProvider + ?Sized> TaxTableProvider for &P {
    fn federal(&self, year: i32) -> Result<Option<FederalTable>> {
        (**self).federal(year)
    }

    fn state(&self, year: i32, state: &str) -> Result<Option<BracketTable>> {
        (**self).state(year, state)
    }
}

/// Normalize a state code for lookups
pub(crate) fn state_key(state: &str) -> String {
    state.trim().to_uppercase()
}

/// In-memory bracket tables, usually parsed from TOML
#[derive(Debug, Clone, Default)]
pub struct TaxTables {
    federal: BTreeMap<i32, FederalTable>,
    states: BTreeMap<(i32, String), BracketTable>,
}

impl TaxTables {
    /// Empty tables (for building up programmatically)
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_TABLES)
    }

    /// Load tables (explicit path first, then the data-dir override, then defaults)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = if let Some(path) = override_path {
            fs::read_to_string(path).map_err(|e| {
                Error::Config(format!(
                    "Failed to read tax tables {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else if let Some(default_path) = default_config_path().filter(|p| p.exists()) {
            debug!("Loading tax tables from {}", default_path.display());
            fs::read_to_string(&default_path)
                .map_err(|e| Error::Config(format!("Failed to read tax tables: {}", e)))?
        } else {
            DEFAULT_TABLES.to_string()
        };

        Self::from_toml_str(&content)
    }

    /// Parse tables from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawTables = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid tax table TOML: {}", e)))?;

        let mut tables = Self::new();

        for federal in raw.federal {
            let brackets = BracketTable::new(federal.brackets).map_err(|e| {
                Error::Config(format!("federal {}: {}", federal.year, e))
            })?;
            if tables.federal.contains_key(&federal.year) {
                return Err(Error::Config(format!(
                    "duplicate federal table for {}",
                    federal.year
                )));
            }
            tables.insert_federal(
                federal.year,
                brackets,
                federal.standard_deduction_single_cents,
            );
        }

        for state in raw.state {
            let key = (state.year, state_key(&state.state));
            let brackets = BracketTable::new(state.brackets).map_err(|e| {
                Error::Config(format!("state {} {}: {}", key.1, key.0, e))
            })?;
            if tables.states.contains_key(&key) {
                return Err(Error::Config(format!(
                    "duplicate state table for {} {}",
                    key.1, key.0
                )));
            }
            tables.states.insert(key, brackets);
        }

        debug!(
            "Loaded tax tables: {} federal years, {} state tables",
            tables.federal.len(),
            tables.states.len()
        );
        Ok(tables)
    }

    pub fn insert_federal(
        &mut self,
        year: i32,
        brackets: BracketTable,
        standard_deduction_single_cents: i64,
    ) {
        self.federal.insert(
            year,
            FederalTable {
                brackets,
                standard_deduction_single_cents,
            },
        );
    }

    pub fn insert_state(&mut self, year: i32, state: &str, brackets: BracketTable) {
        self.states.insert((year, state_key(state)), brackets);
    }

    /// Years with a federal table, ascending
    pub fn years(&self) -> Vec<i32> {
        self.federal.keys().copied().collect()
    }

    /// Most recent year with a federal table
    pub fn latest_year(&self) -> Option<i32> {
        self.federal.keys().next_back().copied()
    }

    /// State codes with a table for the given year, ascending
    pub fn states(&self, year: i32) -> Vec<String> {
        self.states
            .keys()
            .filter(|(y, _)| *y == year)
            .map(|(_, s)| s.clone())
            .collect()
    }

    /// Every state table, for copying into another store
    pub fn state_tables(&self) -> impl Iterator<Item = (i32, &str, &BracketTable)> {
        self.states
            .iter()
            .map(|((year, state), table)| (*year, state.as_str(), table))
    }

    /// Every federal table, for copying into another store
    pub fn federal_tables(&self) -> impl Iterator<Item = (i32, &FederalTable)> {
        self.federal.iter().map(|(year, table)| (*year, table))
    }
}

impl TaxTableProvider for TaxTables {
    fn federal(&self, year: i32) -> Result<Option<FederalTable>> {
        Ok(self.federal.get(&year).cloned())
    }

    fn state(&self, year: i32, state: &str) -> Result<Option<BracketTable>> {
        Ok(self.states.get(&(year, state_key(state))).cloned())
    }
}

/// Default tax table override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("dayboard").join("config").join("tax_tables.toml"))
}

/// Raw table file structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawTables {
    #[serde(default)]
    federal: Vec<RawFederal>,
    #[serde(default)]
    state: Vec<RawState>,
}

#[derive(Debug, Deserialize)]
struct RawFederal {
    year: i32,
    standard_deduction_single_cents: i64,
    brackets: Vec<Bracket>,
}

#[derive(Debug, Deserialize)]
struct RawState {
    year: i32,
    state: String,
    brackets: Vec<Bracket>,
}
