//! Profile command implementations

use anyhow::{bail, Result};
use dayboard_core::models::{PayFrequency, Profile};
use dayboard_core::store::Repository;

use super::{format_cents, parse_date_arg, parse_dollars_arg, Backend};

/// Profile fields from `profile set`; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub home_addr: Option<String>,
    pub office_addr: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub hourly: Option<String>,
    pub hours_per_week: Option<i64>,
    pub stipend: Option<String>,
    pub pay_freq: Option<String>,
    pub start_date: Option<String>,
    pub in_office_days: Option<i64>,
    pub food: Option<String>,
}

impl ProfileUpdate {
    /// Apply the update on top of `profile`
    pub fn apply(self, mut profile: Profile) -> Result<Profile> {
        if let Some(v) = self.home_addr {
            profile.home_addr = v;
        }
        if let Some(v) = self.office_addr {
            profile.office_addr = v;
        }
        if let Some(v) = self.city {
            profile.city = v;
        }
        if let Some(v) = self.state {
            let state = v.trim().to_uppercase();
            if !state.is_empty() && state.len() != 2 {
                bail!("State must be a two-letter code, got {}", v);
            }
            profile.state = state;
        }
        if let Some(v) = self.hourly {
            profile.hourly_cents = Some(parse_dollars_arg("hourly", &v)?);
        }
        if let Some(v) = self.hours_per_week {
            profile.hours_per_week = Some(v);
        }
        if let Some(v) = self.stipend {
            profile.stipend_cents = Some(parse_dollars_arg("stipend", &v)?);
        }
        if let Some(v) = self.pay_freq {
            profile.pay_freq = v.parse::<PayFrequency>().unwrap_or_default();
        }
        if let Some(date) = parse_date_arg("start-date", self.start_date.as_deref())? {
            profile.start_date = Some(date);
        }
        if let Some(v) = self.in_office_days {
            if !(0..=7).contains(&v) {
                bail!("--in-office-days must be between 0 and 7");
            }
            profile.in_office_days = v;
        }
        if let Some(v) = self.food {
            profile.food_cost_cents = parse_dollars_arg("food", &v)?;
        }
        Ok(profile)
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

pub fn cmd_profile_show(backend: &Backend) -> Result<()> {
    let Some(profile) = backend.repo().get_profile()? else {
        println!("No profile set. Run:");
        println!("  dayboard profile set --state IN --hourly 25 --hours-per-week 40");
        return Ok(());
    };

    println!();
    println!("👤 Profile");
    println!("   ─────────────────────────────");
    println!("   Home:            {}", or_dash(&profile.home_addr));
    println!("   Office:          {}", or_dash(&profile.office_addr));
    println!(
        "   Location:        {}, {}",
        or_dash(&profile.city),
        or_dash(&profile.state)
    );
    if let (Some(hourly), Some(hours)) = (profile.hourly_cents, profile.hours_per_week) {
        println!("   Pay:             {}/hr × {} hrs/week", format_cents(hourly), hours);
    }
    if let Some(stipend) = profile.stipend_cents {
        println!("   Stipend:         {}", format_cents(stipend));
    }
    if let Some(annual) = profile.annual_income_cents() {
        println!("   Annualized:      {}", format_cents(annual));
    }
    println!("   Paid:            {}", profile.pay_freq);
    if let Some(start) = profile.start_date {
        println!("   Started:         {}", start);
    }
    println!("   Office days:     {}/week", profile.in_office_days);
    println!("   Food per day:    {}", format_cents(profile.food_cost_cents));

    Ok(())
}

pub fn cmd_profile_set(backend: &Backend, update: ProfileUpdate) -> Result<()> {
    let current = backend.repo().get_profile()?.unwrap_or_default();
    let profile = update.apply(current)?;

    backend.repo().upsert_profile(&profile)?;
    backend.note_unsaved();

    println!("✅ Profile updated");
    Ok(())
}
