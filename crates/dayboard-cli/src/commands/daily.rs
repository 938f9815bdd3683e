//! Commute estimate and daily burn commands

use anyhow::{Context, Result};
use dayboard_core::budget::daily_burn_from;
use dayboard_core::commute::CommuteCostModel;
use dayboard_core::models::NewCommuteEntry;
use dayboard_core::store::Repository;

use super::{format_cents, parse_date_arg, parse_dollars_arg, today, truncate, Backend};

/// Arguments for `commute`
#[derive(Debug, Clone)]
pub struct CommuteArgs {
    pub miles: f64,
    pub minutes: f64,
    pub surge: f64,
    /// Record the trip after estimating it
    pub log: bool,
    /// Actual fare; the low estimate is logged when absent
    pub cost: Option<String>,
    pub from: String,
    pub to: String,
    pub method: String,
    pub date: Option<String>,
}

pub fn cmd_commute(backend: &Backend, args: CommuteArgs) -> Result<()> {
    let estimate = CommuteCostModel::default()
        .estimate(args.miles, args.minutes, args.surge)
        .context("Invalid trip")?;

    println!();
    println!("🚗 Commute Estimate");
    println!("   ─────────────────────────────");
    println!(
        "   {:.1} miles, {:.0} minutes (surge ×{:.2})",
        estimate.distance_miles, estimate.duration_minutes, args.surge
    );
    println!(
        "   Fare: {} - {}",
        format_cents(estimate.est_cost_low_cents),
        format_cents(estimate.est_cost_high_cents)
    );

    if !args.log {
        return Ok(());
    }

    let cost_cents = match &args.cost {
        Some(cost) => parse_dollars_arg("cost", cost)?,
        None => estimate.est_cost_low_cents,
    };
    let date = parse_date_arg("date", args.date.as_deref())?.unwrap_or_else(today);

    let entry = backend.repo().add_commute(NewCommuteEntry {
        date,
        from: args.from,
        to: args.to,
        cost_cents,
        method: args.method,
    })?;
    backend.note_unsaved();

    println!();
    println!(
        "✅ Logged {} {} on {} (ID: {})",
        entry.method,
        format_cents(entry.cost_cents),
        entry.date,
        entry.id
    );
    Ok(())
}

pub fn cmd_burn(backend: &Backend, date: Option<&str>, json: bool) -> Result<()> {
    let day = parse_date_arg("date", date)?.unwrap_or_else(today);
    let burn = daily_burn_from(backend.repo(), day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&burn)?);
        return Ok(());
    }

    println!();
    println!("🔥 Daily Burn for {}", burn.date);
    println!("   ─────────────────────────────");

    for sub in &burn.subscriptions {
        println!(
            "   📋 {:24} {:>10}",
            truncate(&sub.merchant, 24),
            format_cents(sub.amount_cents)
        );
    }
    for trip in &burn.commutes {
        let label = format!("{} → {}", trip.from, trip.to);
        println!(
            "   🚗 {:24} {:>10}",
            truncate(&label, 24),
            format_cents(trip.cost_cents)
        );
    }
    if burn.food_cents > 0 {
        println!("   🍔 {:24} {:>10}", "Food", format_cents(burn.food_cents));
    }

    println!("   ─────────────────────────────");
    println!("   Total: {}", format_cents(burn.total_cents));

    Ok(())
}
