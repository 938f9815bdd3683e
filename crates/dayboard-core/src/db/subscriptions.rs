//! Subscription operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{format_date, parse_date, Database};
use crate::error::Result;
use crate::models::{NewSubscription, RecurringSubscription, Subscription, SubscriptionSource};
use crate::store::{by_next_due, merchant_key};

const SUBSCRIPTION_COLUMNS: &str =
    "id, merchant, amount_cents, cadence_days, next_due, source, is_active, frequency, last_charge";

fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let next_due: Option<String> = row.get(4)?;
    let source: String = row.get(5)?;
    let frequency: Option<String> = row.get(7)?;
    let last_charge: Option<String> = row.get(8)?;

    Ok(Subscription {
        id: row.get(0)?,
        merchant: row.get(1)?,
        amount_cents: row.get(2)?,
        cadence_days: row.get(3)?,
        next_due: next_due.as_deref().and_then(parse_date),
        source: source.parse().unwrap_or_default(),
        is_active: row.get(6)?,
        frequency: frequency.and_then(|s| s.parse().ok()),
        last_charge: last_charge.as_deref().and_then(parse_date),
    })
}

impl Database {
    /// Insert a subscription with an explicit source
    pub fn insert_subscription(
        &self,
        new: NewSubscription,
        source: SubscriptionSource,
    ) -> Result<Subscription> {
        new.validate()?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO subscriptions (merchant, merchant_key, amount_cents, cadence_days, next_due, source, is_active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            "#,
            params![
                new.merchant,
                merchant_key(&new.merchant),
                new.amount_cents,
                new.cadence_days,
                new.next_due.map(format_date),
                source.as_str(),
            ],
        )?;

        Ok(Subscription {
            id: conn.last_insert_rowid(),
            merchant: new.merchant,
            amount_cents: new.amount_cents,
            cadence_days: new.cadence_days,
            next_due: new.next_due,
            source,
            is_active: true,
            frequency: None,
            last_charge: None,
        })
    }

    /// Active subscriptions, soonest due first, unknown due dates last
    pub fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM subscriptions WHERE is_active = 1 ORDER BY next_due IS NULL, next_due, id",
            SUBSCRIPTION_COLUMNS
        ))?;

        let mut subs = stmt
            .query_map([], row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        // Dates that failed to parse come back as None and belong at the end
        subs.sort_by(by_next_due);
        Ok(subs)
    }

    pub fn delete_subscription(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM subscriptions WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Insert or refresh detected subscriptions in one transaction
    pub fn upsert_detected(&self, detected: &[RecurringSubscription]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for found in detected {
            let key = merchant_key(&found.merchant_name);
            let existing: Option<i64> = tx
                .query_row(
                    r#"
                    SELECT id FROM subscriptions
                    WHERE source = 'detected' AND merchant_key = ? AND amount_cents = ?
                    ORDER BY id LIMIT 1
                    "#,
                    params![key, found.amount_cents],
                    |row| row.get(0),
                )
                .optional()?;

            let next_due = format_date(found.next_due_date);
            let last_charge = format_date(found.last_charge_date);

            if let Some(id) = existing {
                tx.execute(
                    r#"
                    UPDATE subscriptions
                    SET merchant = ?, merchant_key = ?, cadence_days = ?, next_due = ?,
                        frequency = ?, last_charge = ?, is_active = 1
                    WHERE id = ?
                    "#,
                    params![
                        found.merchant_name,
                        key,
                        found.cadence_days(),
                        next_due,
                        found.frequency.as_str(),
                        last_charge,
                        id,
                    ],
                )?;
            } else {
                tx.execute(
                    r#"
                    INSERT INTO subscriptions
                        (merchant, merchant_key, amount_cents, cadence_days, next_due, source, is_active, frequency, last_charge)
                    VALUES (?, ?, ?, ?, ?, 'detected', 1, ?, ?)
                    "#,
                    params![
                        found.merchant_name,
                        key,
                        found.amount_cents,
                        found.cadence_days(),
                        next_due,
                        found.frequency.as_str(),
                        last_charge,
                    ],
                )?;
            }
        }

        tx.commit()?;
        debug!("Stored {} detected subscriptions", detected.len());
        Ok(detected.len())
    }
}
