//! Subscription command implementations

use anyhow::{bail, Result};
use dayboard_core::models::{NewSubscription, SubscriptionSource};
use dayboard_core::store::Repository;

use super::{format_cents, parse_date_arg, parse_dollars_arg, truncate, Backend};

pub fn cmd_subscriptions_list(backend: &Backend) -> Result<()> {
    let subscriptions = backend.repo().list_active_subscriptions()?;

    if subscriptions.is_empty() {
        println!("No subscriptions yet. Run:");
        println!("  dayboard detect --file transactions.csv --save");
        return Ok(());
    }

    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    let mut monthly_total = 0;
    for sub in &subscriptions {
        let source_icon = match sub.source {
            SubscriptionSource::Manual => "✍️ ",
            SubscriptionSource::Detected => "🔍",
        };
        let next_due = sub
            .next_due
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());

        println!(
            "   {} #{:<4} {:20} │ {:>9} every {:>3}d │ next {}",
            source_icon,
            sub.id,
            truncate(&sub.merchant, 20),
            format_cents(sub.amount_cents),
            sub.cadence_days,
            next_due
        );

        if sub.cadence_days > 0 {
            monthly_total += sub.amount_cents * 30 / sub.cadence_days;
        }
    }

    println!();
    println!("   ≈ {} per month", format_cents(monthly_total));

    Ok(())
}

pub fn cmd_subscriptions_add(
    backend: &Backend,
    merchant: &str,
    amount: &str,
    cadence_days: i64,
    next_due: Option<&str>,
) -> Result<()> {
    let new = NewSubscription {
        merchant: merchant.trim().to_string(),
        amount_cents: parse_dollars_arg("subscription", amount)?,
        cadence_days,
        next_due: parse_date_arg("next-due", next_due)?,
    };

    let sub = backend.repo().create_subscription(new)?;
    backend.note_unsaved();

    println!(
        "✅ Added {} ({} every {} days, ID: {})",
        sub.merchant,
        format_cents(sub.amount_cents),
        sub.cadence_days,
        sub.id
    );
    Ok(())
}

pub fn cmd_subscriptions_delete(backend: &Backend, id: i64) -> Result<()> {
    if !backend.repo().delete_subscription(id)? {
        bail!("Subscription not found: {}", id);
    }
    backend.note_unsaved();

    println!("✅ Deleted subscription {}", id);
    Ok(())
}
