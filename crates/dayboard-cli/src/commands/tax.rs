//! Tax, state comparison and housing comparison commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use dayboard_core::housing::load_markets;
use dayboard_core::models::{FilingStatus, PayFrequency, TaxProfile, TaxResult};
use dayboard_core::store::Repository;
use dayboard_core::tax::{
    bracket_segments, paychecks_in_term, taxable_income, BracketSegment, TaxEstimator,
    TaxEstimatorConfig,
};
use dayboard_core::tax_tables::TaxTableProvider;
use tracing::debug;

use super::{format_bps, format_cents, parse_dollars_arg, truncate, Backend};
use crate::cli::PayArgs;

/// Estimator input resolved from arguments, falling back to the stored profile
#[derive(Debug)]
pub struct ResolvedPay {
    pub profile: TaxProfile,
    pub year: i32,
}

pub fn resolve_pay(backend: &Backend, pay: &PayArgs, state: Option<&str>) -> Result<ResolvedPay> {
    let stored = backend.repo().get_profile()?;

    let annual_income_cents = match &pay.income {
        Some(income) => parse_dollars_arg("income", income)?,
        None => match stored.as_ref().and_then(|p| p.annual_income_cents()) {
            Some(income) => income,
            None => bail!(
                "No income given. Pass --income or set your pay with: dayboard profile set --hourly 25 --hours-per-week 40"
            ),
        },
    };

    let filing_status: FilingStatus = pay.filing_status.parse()?;

    let pay_frequency = match &pay.pay_freq {
        Some(freq) => freq.parse::<PayFrequency>().unwrap_or_default(),
        None => stored
            .as_ref()
            .map(|p| p.pay_freq)
            .unwrap_or(PayFrequency::Biweekly),
    };

    let state = state
        .map(str::to_string)
        .or_else(|| stored.as_ref().map(|p| p.state.clone()))
        .unwrap_or_default()
        .trim()
        .to_uppercase();

    let year = match pay.year {
        Some(year) => year,
        None => backend
            .latest_tax_year()?
            .context("No tax tables loaded. Run: dayboard init")?,
    };

    Ok(ResolvedPay {
        profile: TaxProfile {
            annual_income_cents,
            state,
            filing_status,
            pay_frequency,
            term_weeks: pay.term_weeks,
        },
        year,
    })
}

fn estimator_config(pay: &PayArgs) -> TaxEstimatorConfig {
    TaxEstimatorConfig {
        strict_jurisdictions: pay.strict,
    }
}

pub fn estimate(backend: &Backend, resolved: &ResolvedPay, pay: &PayArgs) -> Result<TaxResult> {
    let estimator = TaxEstimator::with_config(backend.tax_tables(), estimator_config(pay));
    Ok(estimator.estimate(&resolved.profile, resolved.year)?)
}

fn print_segments(label: &str, segments: &[BracketSegment]) {
    println!("   {}", label);
    if segments.is_empty() {
        println!("     (no tax)");
    }
    for seg in segments {
        let upper = if seg.high_cents == 0 {
            "and up".to_string()
        } else {
            format!("to {}", format_cents(seg.high_cents))
        };
        println!(
            "     {:>12} {:<16} @ {:>7} on {:>12} = {:>11}",
            format_cents(seg.low_cents),
            upper,
            format_bps(seg.rate_bps),
            format_cents(seg.amount_cents),
            format_cents(seg.tax_cents)
        );
    }
}

fn print_breakdown(backend: &Backend, resolved: &ResolvedPay) -> Result<()> {
    let provider = backend.tax_tables();
    let Some(federal) = provider.federal(resolved.year)? else {
        return Ok(());
    };
    let taxable = taxable_income(
        resolved.profile.annual_income_cents,
        federal.standard_deduction_single_cents,
    );

    println!();
    println!(
        "   Standard deduction: {}  │  Taxable income: {}",
        format_cents(federal.standard_deduction_single_cents),
        format_cents(taxable)
    );
    print_segments(
        "Federal brackets:",
        &bracket_segments(federal.brackets.brackets(), taxable),
    );

    if !resolved.profile.state.is_empty() {
        if let Some(state) = provider.state(resolved.year, &resolved.profile.state)? {
            print_segments(
                &format!("{} brackets:", resolved.profile.state),
                &bracket_segments(state.brackets(), taxable),
            );
        }
    }
    Ok(())
}

pub fn cmd_tax(
    backend: &Backend,
    pay: &PayArgs,
    state: Option<&str>,
    breakdown: bool,
    json: bool,
) -> Result<()> {
    let resolved = resolve_pay(backend, pay, state)?;
    let result = estimate(backend, &resolved, pay)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let profile = &resolved.profile;
    let checks = paychecks_in_term(profile.pay_frequency, profile.term_weeks);
    let state_label = if profile.state.is_empty() {
        "no state".to_string()
    } else {
        profile.state.clone()
    };

    println!();
    println!(
        "💵 Tax Estimate ({}, {}, {})",
        resolved.year, state_label, profile.filing_status
    );
    println!("   ─────────────────────────────");
    println!("   Gross income:      {:>12}", format_cents(profile.annual_income_cents));
    println!("   Federal tax:       {:>12}", format_cents(result.federal_cents));
    println!("   State tax:         {:>12}", format_cents(result.state_cents));
    println!("   FICA:              {:>12}", format_cents(result.fica_cents));
    println!("   Net (annual):      {:>12}", format_cents(result.term_net_cents));
    println!(
        "   Per paycheck:      {:>12}  ({} {} checks over {} weeks)",
        format_cents(result.per_paycheck_net_cents),
        checks,
        profile.pay_frequency,
        profile.term_weeks
    );

    if breakdown {
        print_breakdown(backend, &resolved)?;
    }

    Ok(())
}

pub fn cmd_compare_states(
    backend: &Backend,
    pay: &PayArgs,
    states: &[String],
    json: bool,
) -> Result<()> {
    let resolved = resolve_pay(backend, pay, None)?;

    let states: Vec<String> = if states.is_empty() {
        backend.known_states(resolved.year)?
    } else {
        states.to_vec()
    };
    if states.is_empty() {
        bail!("No state tables for {}. Pass states explicitly.", resolved.year);
    }
    let state_refs: Vec<&str> = states.iter().map(String::as_str).collect();

    let estimator = TaxEstimator::with_config(backend.tax_tables(), estimator_config(pay));
    let comparisons = estimator.compare_states(&resolved.profile, resolved.year, &state_refs)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparisons)?);
        return Ok(());
    }

    println!();
    println!(
        "🗺️  State Comparison ({}, gross {})",
        resolved.year,
        format_cents(resolved.profile.annual_income_cents)
    );
    println!("   ─────────────────────────────────────────────────────");
    println!(
        "   {:<6} {:>12} {:>8} {:>14} {:>12}",
        "State", "State tax", "Rate", "Net (annual)", "Paycheck"
    );
    for c in &comparisons {
        println!(
            "   {:<6} {:>12} {:>8} {:>14} {:>12}",
            c.state,
            format_cents(c.state_cents),
            format_bps(c.effective_rate_bps),
            format_cents(c.net_annual_cents),
            format_cents(c.per_paycheck_net_cents)
        );
    }

    Ok(())
}

pub fn cmd_compare_housing(
    backend: &Backend,
    pay: &PayArgs,
    housing: Option<&Path>,
    json: bool,
) -> Result<()> {
    let resolved = resolve_pay(backend, pay, None)?;
    let markets = load_markets(housing).context("Failed to load housing markets")?;

    let known = backend.known_states(resolved.year)?;
    let (markets, skipped): (Vec<_>, Vec<_>) = markets
        .into_iter()
        .partition(|m| known.contains(&m.state));
    for market in &skipped {
        debug!(
            "Skipping {}, {}: no {} tax table",
            market.city, market.state, resolved.year
        );
    }
    if markets.is_empty() {
        bail!(
            "No housing market has a {} state tax table. Try another --year.",
            resolved.year
        );
    }

    let estimator = TaxEstimator::with_config(backend.tax_tables(), estimator_config(pay));
    let comparisons = estimator.compare_housing(&resolved.profile, resolved.year, &markets)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparisons)?);
        return Ok(());
    }

    println!();
    println!(
        "🏠 Housing Comparison ({}, gross {})",
        resolved.year,
        format_cents(resolved.profile.annual_income_cents)
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<20} {:>10} {:>14} {:>16}",
        "City", "Rent/mo", "Net (annual)", "After rent"
    );
    for c in &comparisons {
        println!(
            "   {:<20} {:>10} {:>14} {:>16}",
            truncate(&format!("{}, {}", c.city, c.state), 20),
            format_cents(c.avg_rent_cents),
            format_cents(c.net_annual_cents),
            format_cents(c.net_after_rent_cents)
        );
    }
    if !skipped.is_empty() {
        let names: Vec<&str> = skipped.iter().map(|m| m.city.as_str()).collect();
        println!();
        println!("   No {} tax table for: {}", resolved.year, names.join(", "));
    }

    Ok(())
}
