//! Recurring charge detection
//!
//! Finds subscriptions in a transaction window:
//! - settled debits are grouped by merchant (case-insensitive) and exact amount
//! - a group is recurring when every gap between charges stays within a
//!   tolerance of the group's average gap
//! - cadence and next due date come from the average gap
//!
//! Two charges of the same amount at the same merchant always count as
//! recurring with the default config. That bar is low on purpose and can be
//! raised through [`DetectionConfig::min_occurrences`].

use std::collections::BTreeMap;

use chrono::Duration;
use tracing::debug;

use crate::models::{Frequency, RecurringSubscription, Transaction};

/// Detection configuration
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum charges in a group before a pattern is considered (never below 2)
    pub min_occurrences: usize,
    /// Largest allowed difference, in days, between any gap and the average gap
    pub gap_tolerance_days: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            gap_tolerance_days: 5,
        }
    }
}

/// Detect recurring subscriptions with the default config
pub fn detect_recurring(transactions: &[Transaction]) -> Vec<RecurringSubscription> {
    detect_recurring_with(transactions, &DetectionConfig::default())
}

/// Detect recurring subscriptions
///
/// Output is ordered by (lowercase merchant, amount).
pub fn detect_recurring_with(
    transactions: &[Transaction],
    config: &DetectionConfig,
) -> Vec<RecurringSubscription> {
    let min_occurrences = config.min_occurrences.max(2);

    // Group settled debits by (merchant, amount)
    let mut groups: BTreeMap<(String, i64), Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        if tx.pending || tx.amount_cents < 0 {
            continue; // Skip pending charges and income/credits
        }
        groups
            .entry((tx.merchant_name.to_lowercase(), tx.amount_cents))
            .or_default()
            .push(tx);
    }

    let mut subscriptions = Vec::new();

    for ((merchant, amount), mut txs) in groups {
        if txs.len() < min_occurrences {
            continue;
        }

        // Most recent first; stable, so same-day charges keep input order
        txs.sort_by(|a, b| b.date.cmp(&a.date));

        if !gaps_are_consistent(&txs, config.gap_tolerance_days) {
            debug!(
                "Skipping {} @ {} - irregular gaps across {} charges",
                merchant,
                amount,
                txs.len()
            );
            continue;
        }

        let Some(avg_gap) = average_gap_days(&txs) else {
            continue;
        };
        let latest = txs[0];

        let subscription = RecurringSubscription {
            merchant_name: latest.merchant_name.clone(),
            amount_cents: latest.amount_cents,
            frequency: classify_frequency(avg_gap),
            last_charge_date: latest.date,
            next_due_date: latest.date + Duration::days(avg_gap),
            category: latest.category.clone(),
        };
        debug!(
            "Found recurring charge: {} @ {} every {} days ({})",
            subscription.merchant_name, subscription.amount_cents, avg_gap, subscription.frequency
        );
        subscriptions.push(subscription);
    }

    debug!(
        "Detected {} recurring charges in {} transactions",
        subscriptions.len(),
        transactions.len()
    );
    subscriptions
}

/// Classify a cadence from the average gap in days
pub fn classify_frequency(avg_gap_days: i64) -> Frequency {
    if avg_gap_days <= 8 {
        Frequency::Weekly
    } else if avg_gap_days <= 35 {
        Frequency::Monthly
    } else if avg_gap_days <= 95 {
        Frequency::Quarterly
    } else {
        Frequency::Yearly
    }
}

/// Days between consecutive charges (sorted most recent first)
fn charge_gaps(sorted: &[&Transaction]) -> Vec<i64> {
    sorted
        .windows(2)
        .map(|w| (w[0].date - w[1].date).num_days())
        .collect()
}

/// Full date span divided by the number of gaps (truncating)
fn average_gap_days(sorted: &[&Transaction]) -> Option<i64> {
    if sorted.len() < 2 {
        return None;
    }
    let span = (sorted.first()?.date - sorted.last()?.date).num_days();
    Some(span / (sorted.len() as i64 - 1))
}

/// True when every gap is within `tolerance_days` of the average gap
fn gaps_are_consistent(sorted: &[&Transaction], tolerance_days: i64) -> bool {
    let gaps = charge_gaps(sorted);
    if gaps.is_empty() {
        return false;
    }
    let avg = gaps.iter().sum::<i64>() / gaps.len() as i64;
    gaps.iter().all(|gap| (gap - avg).abs() <= tolerance_days)
}
