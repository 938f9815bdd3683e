//! Recurring charge detection command

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use dayboard_core::demo;
use dayboard_core::detect::{detect_recurring_with, DetectionConfig};
use dayboard_core::import::{parse_csv, parse_json, CSV_HEADERS};
use dayboard_core::models::Transaction;
use dayboard_core::store::Repository;

use super::{format_cents, today, truncate, Backend};

/// Read transactions from a CSV or JSON file (chosen by extension)
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(file).with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        parse_csv(file).with_context(|| {
            format!(
                "Failed to parse {} (expected columns: {})",
                path.display(),
                CSV_HEADERS.join(",")
            )
        })
    }
}

pub fn cmd_detect(
    backend: &Backend,
    file: Option<&Path>,
    save: bool,
    min_occurrences: usize,
    tolerance: i64,
    json: bool,
) -> Result<()> {
    let transactions = match file {
        Some(path) => load_transactions(path)?,
        None if backend.is_demo() => demo::sample_transactions(today()),
        None => bail!("--file is required (or use --demo for sample transactions)"),
    };

    let config = DetectionConfig {
        min_occurrences,
        gap_tolerance_days: tolerance,
    };
    let found = detect_recurring_with(&transactions, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        println!("🔍 Scanned {} transactions", transactions.len());
        if found.is_empty() {
            println!("   No recurring charges found.");
        } else {
            println!();
            println!("📋 Recurring Charges");
            println!("   ─────────────────────────────────────────────────────────────");
            for sub in &found {
                println!(
                    "   {:20} │ {:>9}/{:<9} │ last {} │ next {}",
                    truncate(&sub.merchant_name, 20),
                    format_cents(sub.amount_cents),
                    sub.frequency.as_str(),
                    sub.last_charge_date,
                    sub.next_due_date
                );
            }
        }
    }

    if save {
        let written = backend
            .repo()
            .upsert_detected(&found)
            .context("Failed to save detected subscriptions")?;
        backend.note_unsaved();
        if !json {
            println!();
            println!("✅ Saved {} subscriptions", written);
        }
    }

    Ok(())
}
