//! Domain models for DayBoard
//!
//! All monetary values are integer cents and all rates are basis points,
//! so tax and subscription math never touches floating point.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One marginal-rate band of a bracket table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub low_cents: i64,
    /// Upper bound; 0 marks the unbounded top bracket
    pub high_cents: i64,
    pub rate_bps: i64,
}

impl Bracket {
    pub const fn new(low_cents: i64, high_cents: i64, rate_bps: i64) -> Self {
        Self {
            low_cents,
            high_cents,
            rate_bps,
        }
    }

    /// Top bracket with no upper bound
    pub const fn unbounded(low_cents: i64, rate_bps: i64) -> Self {
        Self::new(low_cents, 0, rate_bps)
    }

    pub fn is_unbounded(&self) -> bool {
        self.high_cents == 0
    }
}

/// Tax filing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    Single,
    /// Married filing jointly (recognised, but estimation rejects it)
    Married,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
        }
    }
}

impl std::str::FromStr for FilingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "married" => Ok(Self::Married),
            _ => Err(Error::InvalidInput(format!(
                "unsupported filing status: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often the user is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Weekly,
    #[default]
    Biweekly,
    Monthly,
    /// Anything else; paychecks are counted like biweekly
    #[serde(other)]
    Other,
}

impl PayFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for PayFrequency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "weekly" => Self::Weekly,
            "biweekly" => Self::Biweekly,
            "monthly" => Self::Monthly,
            _ => Self::Other,
        })
    }
}

impl std::fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input to the tax estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxProfile {
    pub annual_income_cents: i64,
    /// Two-letter state code; empty means no state tax
    pub state: String,
    pub filing_status: FilingStatus,
    pub pay_frequency: PayFrequency,
    pub term_weeks: u32,
}

/// Output of the tax estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub federal_cents: i64,
    pub state_cents: i64,
    pub fica_cents: i64,
    pub per_paycheck_net_cents: i64,
    /// Net annual pay after federal, state and FICA
    pub term_net_cents: i64,
}

impl TaxResult {
    pub fn total_tax_cents(&self) -> i64 {
        self.federal_cents + self.state_cents + self.fica_cents
    }
}

/// A financial transaction from the bank feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    /// Positive = money spent, negative = credit/income
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub merchant_name: String,
    pub pending: bool,
    #[serde(default)]
    pub category: Vec<String>,
}

/// Inferred billing cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Unknown,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring charge inferred from transaction history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSubscription {
    pub merchant_name: String,
    pub amount_cents: i64,
    pub frequency: Frequency,
    pub last_charge_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub category: Vec<String>,
}

impl RecurringSubscription {
    /// Average gap between charges, recovered from the prediction
    pub fn cadence_days(&self) -> i64 {
        (self.next_due_date - self.last_charge_date).num_days()
    }
}

/// Where a stored subscription came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionSource {
    /// Entered by the user
    #[default]
    Manual,
    /// Produced by recurring charge detection
    Detected,
}

impl SubscriptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Detected => "detected",
        }
    }
}

impl std::str::FromStr for SubscriptionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "detected" | "plaid" => Ok(Self::Detected),
            _ => Err(format!("Unknown subscription source: {}", s)),
        }
    }
}

impl std::fmt::Display for SubscriptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored subscription (manual or detected)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i64,
    pub merchant: String,
    pub amount_cents: i64,
    pub cadence_days: i64,
    pub next_due: Option<NaiveDate>,
    pub source: SubscriptionSource,
    pub is_active: bool,
    /// Detected cadence (detected subscriptions only)
    pub frequency: Option<Frequency>,
    pub last_charge: Option<NaiveDate>,
}

/// A manual subscription before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub merchant: String,
    pub amount_cents: i64,
    pub cadence_days: i64,
    pub next_due: Option<NaiveDate>,
}

impl NewSubscription {
    pub fn validate(&self) -> Result<()> {
        if self.merchant.trim().is_empty() || self.amount_cents <= 0 || self.cadence_days <= 0 {
            return Err(Error::InvalidInput("invalid subscription fields".into()));
        }
        Ok(())
    }
}

/// User settings used for tax and cost estimation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub home_addr: String,
    pub office_addr: String,
    pub city: String,
    pub state: String,
    pub hourly_cents: Option<i64>,
    pub hours_per_week: Option<i64>,
    pub stipend_cents: Option<i64>,
    pub pay_freq: PayFrequency,
    pub start_date: Option<NaiveDate>,
    pub in_office_days: i64,
    pub food_cost_cents: i64,
}

impl Profile {
    /// Annualised gross pay: hourly wage when known, otherwise the stipend
    ///
    /// Saturates at `i64::MAX`; the estimator rejects incomes that large.
    pub fn annual_income_cents(&self) -> Option<i64> {
        match (self.hourly_cents, self.hours_per_week) {
            (Some(hourly), Some(hours)) => Some(hourly.saturating_mul(hours).saturating_mul(52)),
            _ => self.stipend_cents,
        }
    }

    /// Build an estimator input from this profile
    pub fn tax_profile(&self, filing_status: FilingStatus, term_weeks: u32) -> Result<TaxProfile> {
        let annual_income_cents = self.annual_income_cents().ok_or_else(|| {
            Error::InvalidInput("profile has no hourly wage or stipend".into())
        })?;
        Ok(TaxProfile {
            annual_income_cents,
            state: self.state.clone(),
            filing_status,
            pay_frequency: self.pay_freq,
            term_weeks,
        })
    }
}

/// A logged commute with its actual cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub from: String,
    pub to: String,
    pub cost_cents: i64,
    pub method: String,
}

/// A commute before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommuteEntry {
    pub date: NaiveDate,
    pub from: String,
    pub to: String,
    pub cost_cents: i64,
    pub method: String,
}
