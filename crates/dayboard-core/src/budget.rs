//! Daily burn: what today costs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CommuteEntry, Profile, Subscription};
use crate::store::Repository;

/// Spending for one day with its breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBurn {
    pub date: NaiveDate,
    pub total_cents: i64,
    /// Subscriptions due on the day
    pub subscriptions: Vec<Subscription>,
    /// Commutes logged on the day
    pub commutes: Vec<CommuteEntry>,
    pub food_cents: i64,
}

/// Sum subscriptions due on `day`, that day's commutes and the food allowance
pub fn daily_burn(
    subscriptions: &[Subscription],
    commutes: &[CommuteEntry],
    profile: Option<&Profile>,
    day: NaiveDate,
) -> DailyBurn {
    let due: Vec<Subscription> = subscriptions
        .iter()
        .filter(|s| s.is_active && s.next_due == Some(day))
        .cloned()
        .collect();
    let todays_commutes: Vec<CommuteEntry> =
        commutes.iter().filter(|c| c.date == day).cloned().collect();
    let food_cents = profile.map(|p| p.food_cost_cents).unwrap_or(0);

    let total_cents = due.iter().map(|s| s.amount_cents).sum::<i64>()
        + todays_commutes.iter().map(|c| c.cost_cents).sum::<i64>()
        + food_cents;

    DailyBurn {
        date: day,
        total_cents,
        subscriptions: due,
        commutes: todays_commutes,
        food_cents,
    }
}

/// Daily burn read straight from a repository
pub fn daily_burn_from(repo: &dyn Repository, day: NaiveDate) -> Result<DailyBurn> {
    let subscriptions = repo.list_active_subscriptions()?;
    let commutes = repo.list_commutes()?;
    let profile = repo.get_profile()?;
    Ok(daily_burn(&subscriptions, &commutes, profile.as_ref(), day))
}
