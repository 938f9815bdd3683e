//! Repository interface and the in-memory store
//!
//! Everything above the core algorithms talks to storage through
//! [`Repository`]. Two implementations exist:
//! - [`MemoryStore`] - process-local, used for demo mode and tests
//! - [`crate::db::Database`] - SQLite-backed

use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    CommuteEntry, NewCommuteEntry, NewSubscription, Profile, RecurringSubscription, Subscription,
    SubscriptionSource,
};

/// Storage for subscriptions, the user profile and the commute log
pub trait Repository: Send + Sync {
    /// Active subscriptions, soonest due first, unknown due dates last
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>>;

    /// Store a manual subscription
    fn create_subscription(&self, new: NewSubscription) -> Result<Subscription>;

    /// Remove a subscription; false if it did not exist
    fn delete_subscription(&self, id: i64) -> Result<bool>;

    /// Insert or refresh detected subscriptions, returning how many were written
    ///
    /// Rows are matched on lowercase merchant and amount among detected rows;
    /// manual subscriptions are never touched.
    fn upsert_detected(&self, detected: &[RecurringSubscription]) -> Result<usize>;

    fn get_profile(&self) -> Result<Option<Profile>>;

    fn upsert_profile(&self, profile: &Profile) -> Result<()>;

    /// Commute log, oldest first
    fn list_commutes(&self) -> Result<Vec<CommuteEntry>>;

    fn add_commute(&self, entry: NewCommuteEntry) -> Result<CommuteEntry>;
}

/// Key detected subscriptions are matched on, alongside the amount
///
/// Unicode-aware, so "CAFÉ" and "café" are the same merchant in every store.
pub(crate) fn merchant_key(merchant: &str) -> String {
    merchant.to_lowercase()
}

/// Order subscriptions by next due date, unknown dates last
pub(crate) fn by_next_due(a: &Subscription, b: &Subscription) -> Ordering {
    match (a.next_due, b.next_due) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Default)]
struct MemoryState {
    subscriptions: Vec<Subscription>,
    profile: Option<Profile>,
    commutes: Vec<CommuteEntry>,
    next_id: i64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory repository
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| Error::Config("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| Error::Config("memory store lock poisoned".into()))
    }

    /// Store a subscription with an explicit source (used by demo seeding)
    pub fn insert_subscription(
        &self,
        new: NewSubscription,
        source: SubscriptionSource,
    ) -> Result<Subscription> {
        new.validate()?;
        let mut state = self.write()?;
        let subscription = Subscription {
            id: state.allocate_id(),
            merchant: new.merchant,
            amount_cents: new.amount_cents,
            cadence_days: new.cadence_days,
            next_due: new.next_due,
            source,
            is_active: true,
            frequency: None,
            last_charge: None,
        };
        state.subscriptions.push(subscription.clone());
        Ok(subscription)
    }
}

impl Repository for MemoryStore {
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut subs: Vec<_> = self
            .read()?
            .subscriptions
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        subs.sort_by(by_next_due);
        Ok(subs)
    }

    fn create_subscription(&self, new: NewSubscription) -> Result<Subscription> {
        self.insert_subscription(new, SubscriptionSource::Manual)
    }

    fn delete_subscription(&self, id: i64) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.id != id);
        Ok(state.subscriptions.len() != before)
    }

    fn upsert_detected(&self, detected: &[RecurringSubscription]) -> Result<usize> {
        let mut state = self.write()?;
        let mut written = 0;

        for found in detected {
            let key = merchant_key(&found.merchant_name);
            let existing = state.subscriptions.iter_mut().find(|s| {
                s.source == SubscriptionSource::Detected
                    && merchant_key(&s.merchant) == key
                    && s.amount_cents == found.amount_cents
            });

            match existing {
                Some(sub) => {
                    sub.merchant = found.merchant_name.clone();
                    sub.cadence_days = found.cadence_days();
                    sub.next_due = Some(found.next_due_date);
                    sub.frequency = Some(found.frequency);
                    sub.last_charge = Some(found.last_charge_date);
                    sub.is_active = true;
                }
                None => {
                    let id = state.allocate_id();
                    state.subscriptions.push(Subscription {
                        id,
                        merchant: found.merchant_name.clone(),
                        amount_cents: found.amount_cents,
                        cadence_days: found.cadence_days(),
                        next_due: Some(found.next_due_date),
                        source: SubscriptionSource::Detected,
                        is_active: true,
                        frequency: Some(found.frequency),
                        last_charge: Some(found.last_charge_date),
                    });
                }
            }
            written += 1;
        }

        debug!("Stored {} detected subscriptions in memory", written);
        Ok(written)
    }

    fn get_profile(&self) -> Result<Option<Profile>> {
        Ok(self.read()?.profile.clone())
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        self.write()?.profile = Some(profile.clone());
        Ok(())
    }

    fn list_commutes(&self) -> Result<Vec<CommuteEntry>> {
        let mut commutes = self.read()?.commutes.clone();
        commutes.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(commutes)
    }

    fn add_commute(&self, entry: NewCommuteEntry) -> Result<CommuteEntry> {
        if entry.cost_cents < 0 {
            return Err(Error::InvalidInput(format!(
                "commute cost must not be negative: {}",
                entry.cost_cents
            )));
        }
        let mut state = self.write()?;
        let commute = CommuteEntry {
            id: state.allocate_id(),
            date: entry.date,
            from: entry.from,
            to: entry.to,
            cost_cents: entry.cost_cents,
            method: entry.method,
        };
        state.commutes.push(commute.clone());
        Ok(commute)
    }
}
