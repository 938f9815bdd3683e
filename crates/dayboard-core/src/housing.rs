//! Net pay after rent, city by city
//!
//! Rent markets load the same way as tax tables: an explicit file, then the
//! data-dir override (~/.local/share/dayboard/config/housing.toml), then the
//! embedded defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::TaxProfile;
use crate::tax::TaxEstimator;
use crate::tax_tables::{state_key, TaxTableProvider};

/// Embedded default markets (compiled into binary)
const DEFAULT_MARKETS: &str = include_str!("../../../config/housing.toml");

const MONTHS_PER_YEAR: i64 = 12;

/// Average monthly rent in one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentMarket {
    pub city: String,
    /// Two-letter state code, upper-case
    pub state: String,
    pub avg_rent_cents: i64,
}

/// Net pay in one city once a year of rent is paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingComparison {
    pub city: String,
    pub state: String,
    /// Monthly
    pub avg_rent_cents: i64,
    pub net_annual_cents: i64,
    /// Net annual pay minus twelve months of rent
    pub net_after_rent_cents: i64,
}

/// Markets compiled into the binary
pub fn embedded_markets() -> Result<Vec<RentMarket>> {
    markets_from_toml_str(DEFAULT_MARKETS)
}

/// Load markets (explicit path first, then the data-dir override, then defaults)
pub fn load_markets(override_path: Option<&Path>) -> Result<Vec<RentMarket>> {
    let content = if let Some(path) = override_path {
        fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read housing markets {}: {}",
                path.display(),
                e
            ))
        })?
    } else if let Some(default_path) = default_markets_path().filter(|p| p.exists()) {
        debug!("Loading housing markets from {}", default_path.display());
        fs::read_to_string(&default_path)
            .map_err(|e| Error::Config(format!("Failed to read housing markets: {}", e)))?
    } else {
        DEFAULT_MARKETS.to_string()
    };

    markets_from_toml_str(&content)
}

/// Parse markets from TOML content
pub fn markets_from_toml_str(content: &str) -> Result<Vec<RentMarket>> {
    let raw: RawMarkets = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid housing TOML: {}", e)))?;

    raw.market
        .into_iter()
        .map(|m| {
            let city = m.city.trim().to_string();
            let state = state_key(&m.state);
            if city.is_empty() || state.len() != 2 {
                return Err(Error::Config(format!(
                    "market needs a city and a two-letter state: {:?}, {:?}",
                    m.city, m.state
                )));
            }
            if m.avg_rent_cents < 0 {
                return Err(Error::Config(format!(
                    "negative rent for {}: {}",
                    city, m.avg_rent_cents
                )));
            }
            Ok(RentMarket {
                city,
                state,
                avg_rent_cents: m.avg_rent_cents,
            })
        })
        .collect()
}

/// Default housing override path
pub fn default_markets_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("dayboard").join("config").join("housing.toml"))
}

impl<'a, P: TaxTableProvider + ?Sized> TaxEstimator<'a, P> {
    /// Compare net pay after rent across cities
    ///
    /// Each state is estimated once. Sorted by net after rent, highest first.
    pub fn compare_housing(
        &self,
        profile: &TaxProfile,
        year: i32,
        markets: &[RentMarket],
    ) -> Result<Vec<HousingComparison>> {
        let mut states: Vec<String> = markets.iter().map(|m| state_key(&m.state)).collect();
        states.sort_unstable();
        states.dedup();
        let state_refs: Vec<&str> = states.iter().map(String::as_str).collect();

        let net_by_state: BTreeMap<String, i64> = self
            .compare_states(profile, year, &state_refs)?
            .into_iter()
            .map(|c| (c.state, c.net_annual_cents))
            .collect();

        let mut comparisons = Vec::with_capacity(markets.len());
        for market in markets {
            let state = state_key(&market.state);
            let net_annual_cents = net_by_state.get(&state).copied().unwrap_or(0);
            let yearly_rent = market
                .avg_rent_cents
                .checked_mul(MONTHS_PER_YEAR)
                .ok_or_else(|| {
                    Error::InvalidInput(format!("rent out of range for {}", market.city))
                })?;

            comparisons.push(HousingComparison {
                city: market.city.clone(),
                state,
                avg_rent_cents: market.avg_rent_cents,
                net_annual_cents,
                net_after_rent_cents: net_annual_cents - yearly_rent,
            });
        }

        comparisons.sort_by(|a, b| {
            b.net_after_rent_cents
                .cmp(&a.net_after_rent_cents)
                .then_with(|| a.city.cmp(&b.city))
        });
        Ok(comparisons)
    }
}

#[derive(Debug, Deserialize)]
struct RawMarkets {
    #[serde(default)]
    market: Vec<RawMarket>,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    city: String,
    state: String,
    avg_rent_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilingStatus, PayFrequency};
    use crate::tax_tables::{BracketTable, TaxTables};

    fn tables() -> TaxTables {
        let mut tables = TaxTables::new();
        tables.insert_federal(2023, BracketTable::flat(2200).unwrap(), 1_385_000);
        tables.insert_state(2023, "IN", BracketTable::flat(500).unwrap());
        tables.insert_state(2023, "TX", BracketTable::default());
        tables
    }

    fn profile() -> TaxProfile {
        TaxProfile {
            annual_income_cents: 5_200_000,
            state: String::new(),
            filing_status: FilingStatus::Single,
            pay_frequency: PayFrequency::Biweekly,
            term_weeks: 12,
        }
    }

    fn market(city: &str, state: &str, avg_rent_cents: i64) -> RentMarket {
        RentMarket {
            city: city.into(),
            state: state.into(),
            avg_rent_cents,
        }
    }

    #[test]
    fn test_embedded_markets() {
        let markets = embedded_markets().unwrap();
        assert!(markets.len() >= 5);
        let sf = markets.iter().find(|m| m.city == "San Francisco").unwrap();
        assert_eq!(sf.state, "CA");
        assert_eq!(sf.avg_rent_cents, 350_000);
    }

    #[test]
    fn test_markets_validation() {
        let content = r#"
            [[market]]
            city = "Austin"
            state = "tx"
            avg_rent_cents = 180000
        "#;
        assert_eq!(markets_from_toml_str(content).unwrap()[0].state, "TX");

        let bad_state = r#"
            [[market]]
            city = "Austin"
            state = "Texas"
            avg_rent_cents = 180000
        "#;
        assert!(matches!(
            markets_from_toml_str(bad_state),
            Err(Error::Config(_))
        ));

        let negative = r#"
            [[market]]
            city = "Austin"
            state = "TX"
            avg_rent_cents = -1
        "#;
        assert!(markets_from_toml_str(negative).is_err());
    }

    #[test]
    fn test_load_markets_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("housing.toml");
        fs::write(
            &path,
            "[[market]]\ncity = \"Boise\"\nstate = \"ID\"\navg_rent_cents = 130000\n",
        )
        .unwrap();

        let markets = load_markets(Some(path.as_path())).unwrap();
        assert_eq!(markets, vec![market("Boise", "ID", 130_000)]);

        let missing = dir.path().join("missing.toml");
        assert!(load_markets(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_compare_housing_subtracts_a_year_of_rent() {
        let tables = tables();
        let estimator = TaxEstimator::new(&tables);
        let markets = [
            market("Austin", "TX", 180_000),
            market("Indianapolis", "IN", 120_000),
            market("Houston", "tx", 150_000),
        ];

        let result = estimator.compare_housing(&profile(), 2023, &markets).unwrap();
        let cities: Vec<&str> = result.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(cities, vec!["Indianapolis", "Houston", "Austin"]);

        // IN: 5,200,000 - 839,300 federal - 190,750 state - 397,800 FICA
        assert_eq!(result[0].net_annual_cents, 3_772_150);
        assert_eq!(result[0].net_after_rent_cents, 3_772_150 - 1_440_000);
        // TX has no state tax
        assert_eq!(result[1].state, "TX");
        assert_eq!(result[1].net_annual_cents, 3_962_900);
        assert_eq!(result[1].net_after_rent_cents, 3_962_900 - 1_800_000);
        assert_eq!(result[2].net_after_rent_cents, 3_962_900 - 2_160_000);
    }

    #[test]
    fn test_compare_housing_rejects_overflowing_rent() {
        let tables = tables();
        let estimator = TaxEstimator::new(&tables);
        let markets = [market("Nowhere", "TX", i64::MAX / 2)];
        assert!(matches!(
            estimator.compare_housing(&profile(), 2023, &markets),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compare_housing_empty() {
        let tables = tables();
        let estimator = TaxEstimator::new(&tables);
        assert!(estimator.compare_housing(&profile(), 2023, &[]).unwrap().is_empty());
    }
}
