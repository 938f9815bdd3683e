//! Demo data for running without a database

use chrono::{Days, Duration, Months, NaiveDate};

use crate::error::Result;
use crate::models::{
    NewCommuteEntry, NewSubscription, PayFrequency, Profile, SubscriptionSource, Transaction,
};
use crate::store::{MemoryStore, Repository};

/// Fill a store with a small, realistic data set relative to `today`
pub fn seed(store: &MemoryStore, today: NaiveDate) -> Result<()> {
    let subscriptions = [
        ("Spotify", 999, today + Duration::days(1), SubscriptionSource::Manual),
        ("Notion", 800, today + Duration::days(6), SubscriptionSource::Manual),
        ("Netflix", 1599, today, SubscriptionSource::Detected),
    ];
    for (merchant, amount_cents, next_due, source) in subscriptions {
        store.insert_subscription(
            NewSubscription {
                merchant: merchant.to_string(),
                amount_cents,
                cadence_days: 30,
                next_due: Some(next_due),
            },
            source,
        )?;
    }

    store.upsert_profile(&Profile {
        home_addr: "123 Main St, Indianapolis, IN".into(),
        office_addr: "456 Company Rd, Indianapolis, IN".into(),
        city: "Indianapolis".into(),
        state: "IN".into(),
        hourly_cents: Some(2500),
        hours_per_week: Some(40),
        stipend_cents: None,
        pay_freq: PayFrequency::Biweekly,
        start_date: today.checked_sub_months(Months::new(1)),
        in_office_days: 3,
        food_cost_cents: 1200,
    })?;

    store.add_commute(NewCommuteEntry {
        date: today,
        from: "Home".into(),
        to: "Office".into(),
        cost_cents: 1250,
        method: "Uber".into(),
    })?;

    Ok(())
}

/// A transaction history ending at `today` with a few recurring charges mixed in
///
/// Contains a monthly Netflix and Spotify, a weekly coffee habit, irregular
/// grocery runs, a pending charge and a payroll credit.
pub fn sample_transactions(today: NaiveDate) -> Vec<Transaction> {
    let mut txns = Vec::new();
    let mut push = |days_ago: u64, merchant: &str, amount_cents: i64, pending: bool, category: &[&str]| {
        let date = today - Days::new(days_ago);
        txns.push(Transaction {
            id: format!("demo-{}", txns.len() + 1),
            account_id: "demo-checking".into(),
            amount_cents,
            date,
            merchant_name: merchant.to_string(),
            pending,
            category: category.iter().map(|c| c.to_string()).collect(),
        });
    };

    for days_ago in [90, 60, 30, 0] {
        push(days_ago, "Netflix", 1599, false, &["Service", "Entertainment"]);
    }
    for days_ago in [61, 31, 1] {
        push(days_ago, "Spotify", 999, false, &["Service", "Music"]);
    }
    for days_ago in [23, 16, 9, 2] {
        push(days_ago, "Blue Bottle Coffee", 650, false, &["Food and Drink", "Coffee"]);
    }
    for (days_ago, amount_cents) in [(40, 8423), (26, 5210), (11, 10_077), (3, 3150)] {
        push(days_ago, "Kroger", amount_cents, false, &["Shops", "Groceries"]);
    }
    push(0, "Blue Bottle Coffee", 650, true, &["Food and Drink", "Coffee"]);
    push(14, "Payroll", -184_000, false, &["Transfer", "Payroll"]);

    txns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect_recurring;
    use crate::models::Frequency;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
    }

    #[test]
    fn test_seed_populates_store() {
        let store = MemoryStore::new();
        seed(&store, today()).unwrap();

        let subs = store.list_active_subscriptions().unwrap();
        let names: Vec<_> = subs.iter().map(|s| s.merchant.as_str()).collect();
        assert_eq!(names, vec!["Netflix", "Spotify", "Notion"]);
        assert_eq!(subs[0].source, SubscriptionSource::Detected);

        let profile = store.get_profile().unwrap().unwrap();
        assert_eq!(profile.state, "IN");
        assert_eq!(profile.annual_income_cents(), Some(5_200_000));
        assert_eq!(profile.start_date, NaiveDate::from_ymd_opt(2024, 8, 15));

        assert_eq!(store.list_commutes().unwrap().len(), 1);
    }

    #[test]
    fn test_sample_transactions_detect() {
        let found = detect_recurring(&sample_transactions(today()));
        let summary: Vec<_> = found
            .iter()
            .map(|s| (s.merchant_name.as_str(), s.frequency))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Blue Bottle Coffee", Frequency::Weekly),
                ("Netflix", Frequency::Monthly),
                ("Spotify", Frequency::Monthly),
            ]
        );
        assert_eq!(found[1].next_due_date, today() + Duration::days(30));
    }
}
