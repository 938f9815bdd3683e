//! Progressive income-tax estimation
//!
//! Federal and state tax are computed by walking a bracket table from the
//! bottom up, taxing the slice of taxable income that falls inside each
//! bracket. FICA is a flat 7.65% of gross pay (no wage base cap, no
//! Social Security / Medicare split).
//!
//! All arithmetic is integer: each bracket's tax is truncated, not rounded.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Bracket, FilingStatus, PayFrequency, TaxProfile, TaxResult};
use crate::tax_tables::{BracketTable, TaxTableProvider};

/// FICA rate in basis points (7.65%)
pub const FICA_RATE_BPS: i64 = 765;

/// Largest annual income the estimator accepts ($10 quadrillion)
///
/// Federal, state and FICA together stay far below `i64::MAX` at this income.
pub const MAX_INCOME_CENTS: i64 = 1_000_000_000_000_000_000;

const BPS_DIVISOR: i64 = 10_000;

/// `amount × rate_bps / 10 000`, truncated, without intermediate overflow
fn apply_rate(amount_cents: i64, rate_bps: i64) -> i64 {
    let tax = i128::from(amount_cents) * i128::from(rate_bps) / i128::from(BPS_DIVISOR);
    i64::try_from(tax).unwrap_or(if tax < 0 { i64::MIN } else { i64::MAX })
}

/// The part of taxable income that fell inside one bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSegment {
    pub low_cents: i64,
    /// 0 for the unbounded top bracket
    pub high_cents: i64,
    pub rate_bps: i64,
    /// Income taxed at this bracket's rate
    pub amount_cents: i64,
    pub tax_cents: i64,
}

/// Split taxable income across brackets
///
/// Brackets must be sorted ascending by low bound. The walk stops as soon as
/// all income is allocated, so trailing brackets produce no segment.
pub fn bracket_segments(brackets: &[Bracket], taxable_cents: i64) -> Vec<BracketSegment> {
    let mut segments = Vec::new();
    let mut remaining = taxable_cents;

    for bracket in brackets {
        if remaining <= 0 {
            break;
        }
        let upper = if bracket.is_unbounded() {
            taxable_cents
        } else {
            bracket.high_cents
        };
        let amount = remaining.min(upper - bracket.low_cents);
        segments.push(BracketSegment {
            low_cents: bracket.low_cents,
            high_cents: bracket.high_cents,
            rate_bps: bracket.rate_bps,
            amount_cents: amount,
            tax_cents: apply_rate(amount, bracket.rate_bps),
        });
        remaining -= amount;
    }

    segments
}

/// Tax owed on `taxable_cents` under a bracket table
pub fn bracket_tax(brackets: &[Bracket], taxable_cents: i64) -> i64 {
    bracket_segments(brackets, taxable_cents)
        .iter()
        .map(|s| s.tax_cents)
        .sum()
}

/// Gross income minus the standard deduction, floored at zero
pub fn taxable_income(annual_income_cents: i64, standard_deduction_cents: i64) -> i64 {
    (annual_income_cents - standard_deduction_cents).max(0)
}

/// FICA on gross income
pub fn fica_tax(annual_income_cents: i64) -> i64 {
    apply_rate(annual_income_cents, FICA_RATE_BPS)
}

/// Number of paychecks in a term of `term_weeks` weeks
pub fn paychecks_in_term(frequency: PayFrequency, term_weeks: u32) -> i64 {
    let weeks = i64::from(term_weeks);
    match frequency {
        PayFrequency::Weekly => weeks,
        PayFrequency::Biweekly => weeks / 2,
        // Approximates a month as four weeks
        PayFrequency::Monthly => weeks / 4,
        PayFrequency::Other => weeks / 2,
    }
}

/// Reject filing statuses the estimator cannot compute
pub fn check_filing_status(status: FilingStatus) -> Result<()> {
    match status {
        FilingStatus::Single => Ok(()),
        FilingStatus::Married => Err(Error::Unsupported(
            "married filing jointly not yet supported".into(),
        )),
    }
}

/// Estimate federal, state and FICA tax plus net pay
///
/// `state_brackets` of `None` (or an empty slice) contributes no state tax.
/// State tax uses the same taxable income as federal; there is no separate
/// state deduction.
pub fn estimate_taxes(
    profile: &TaxProfile,
    federal_brackets: &[Bracket],
    state_brackets: Option<&[Bracket]>,
    standard_deduction_cents: i64,
) -> Result<TaxResult> {
    check_filing_status(profile.filing_status)?;
    if profile.annual_income_cents < 0 {
        return Err(Error::InvalidInput(format!(
            "annual income must not be negative: {}",
            profile.annual_income_cents
        )));
    }
    if profile.annual_income_cents > MAX_INCOME_CENTS {
        return Err(Error::InvalidInput(format!(
            "annual income above {} cents is not supported: {}",
            MAX_INCOME_CENTS, profile.annual_income_cents
        )));
    }
    if standard_deduction_cents < 0 {
        return Err(Error::InvalidInput(format!(
            "standard deduction must not be negative: {}",
            standard_deduction_cents
        )));
    }

    let income = profile.annual_income_cents;
    let taxable = taxable_income(income, standard_deduction_cents);

    let federal_cents = bracket_tax(federal_brackets, taxable);
    let state_cents = state_brackets
        .map(|brackets| bracket_tax(brackets, taxable))
        .unwrap_or(0);
    let fica_cents = fica_tax(income);

    let checks = paychecks_in_term(profile.pay_frequency, profile.term_weeks);
    let net_annual = income - (federal_cents + state_cents + fica_cents);
    let per_paycheck_net_cents = if checks > 0 { net_annual / checks } else { 0 };

    Ok(TaxResult {
        federal_cents,
        state_cents,
        fica_cents,
        per_paycheck_net_cents,
        term_net_cents: net_annual,
    })
}

/// Estimator behaviour switches
#[derive(Debug, Clone, Default)]
pub struct TaxEstimatorConfig {
    /// Reject states with no bracket data instead of taxing them at zero
    pub strict_jurisdictions: bool,
}

/// Net pay in one state, for side-by-side comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateComparison {
    pub state: String,
    pub state_cents: i64,
    /// State tax as a share of gross income
    pub effective_rate_bps: i64,
    pub net_annual_cents: i64,
    pub per_paycheck_net_cents: i64,
}

/// Estimates taxes against bracket tables from a provider
pub struct TaxEstimator<'a, P: TaxTableProvider + ?Sized> {
    provider: &'a P,
    config: TaxEstimatorConfig,
}

impl<'a, P: TaxTableProvider + ?Sized> TaxEstimator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            config: TaxEstimatorConfig::default(),
        }
    }

    pub fn with_config(provider: &'a P, config: TaxEstimatorConfig) -> Self {
        Self { provider, config }
    }

    /// Estimate taxes for a tax year
    ///
    /// The filing status is checked before any table lookup, so a married
    /// profile is rejected even for a year with no data.
    pub fn estimate(&self, profile: &TaxProfile, year: i32) -> Result<TaxResult> {
        check_filing_status(profile.filing_status)?;

        let federal = self.provider.federal(year)?.ok_or_else(|| {
            Error::BracketLookup(format!("no federal tax table for year {}", year))
        })?;

        let state = self.state_table(profile, year)?;
        let state_brackets = state.as_ref().map(|t| t.brackets());

        debug!(
            "Estimating {} tax for {} cents (state {:?}, {} federal brackets)",
            year,
            profile.annual_income_cents,
            profile.state,
            federal.brackets.brackets().len()
        );

        estimate_taxes(
            profile,
            federal.brackets.brackets(),
            state_brackets,
            federal.standard_deduction_single_cents,
        )
    }

    /// Compare net pay for the same profile across several states
    ///
    /// Sorted by net annual pay, highest first.
    pub fn compare_states(
        &self,
        profile: &TaxProfile,
        year: i32,
        states: &[&str],
    ) -> Result<Vec<StateComparison>> {
        let mut comparisons = Vec::with_capacity(states.len());

        for state in states {
            let candidate = TaxProfile {
                state: state.trim().to_uppercase(),
                ..profile.clone()
            };
            let result = self.estimate(&candidate, year)?;
            let effective_rate_bps = if candidate.annual_income_cents > 0 {
                let rate = i128::from(result.state_cents) * i128::from(BPS_DIVISOR)
                    / i128::from(candidate.annual_income_cents);
                i64::try_from(rate).unwrap_or(i64::MAX)
            } else {
                0
            };
            comparisons.push(StateComparison {
                state: candidate.state,
                state_cents: result.state_cents,
                effective_rate_bps,
                net_annual_cents: result.term_net_cents,
                per_paycheck_net_cents: result.per_paycheck_net_cents,
            });
        }

        comparisons.sort_by(|a, b| {
            b.net_annual_cents
                .cmp(&a.net_annual_cents)
                .then_with(|| a.state.cmp(&b.state))
        });
        Ok(comparisons)
    }

    fn state_table(&self, profile: &TaxProfile, year: i32) -> Result<Option<BracketTable>> {
        if profile.state.trim().is_empty() {
            return Ok(None);
        }
        match self.provider.state(year, &profile.state)? {
            Some(table) => Ok(Some(table)),
            None if self.config.strict_jurisdictions => Err(Error::UnknownJurisdiction(format!(
                "no {} tax table for state {}",
                year, profile.state
            ))),
            None => {
                warn!(
                    "No {} tax table for state {}; assuming no state tax",
                    year, profile.state
                );
                Ok(None)
            }
        }
    }
}
