//! Profile and commute log operations

use rusqlite::{params, OptionalExtension};

use super::{format_date, parse_date, Database};
use crate::error::{Error, Result};
use crate::models::{CommuteEntry, NewCommuteEntry, Profile};

impl Database {
    pub fn get_profile(&self) -> Result<Option<Profile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                r#"
                SELECT home_addr, office_addr, city, state, hourly_cents, hours_per_week,
                       stipend_cents, pay_freq, start_date, in_office_days, food_cost_cents
                FROM profile WHERE id = 1
                "#,
                [],
                |row| {
                    let pay_freq: String = row.get(7)?;
                    let start_date: Option<String> = row.get(8)?;
                    Ok(Profile {
                        home_addr: row.get(0)?,
                        office_addr: row.get(1)?,
                        city: row.get(2)?,
                        state: row.get(3)?,
                        hourly_cents: row.get(4)?,
                        hours_per_week: row.get(5)?,
                        stipend_cents: row.get(6)?,
                        pay_freq: pay_freq.parse().unwrap_or_default(),
                        start_date: start_date.as_deref().and_then(parse_date),
                        in_office_days: row.get(9)?,
                        food_cost_cents: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Replace the stored profile
    pub fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO profile (id, home_addr, office_addr, city, state, hourly_cents, hours_per_week,
                                 stipend_cents, pay_freq, start_date, in_office_days, food_cost_cents)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                home_addr = excluded.home_addr,
                office_addr = excluded.office_addr,
                city = excluded.city,
                state = excluded.state,
                hourly_cents = excluded.hourly_cents,
                hours_per_week = excluded.hours_per_week,
                stipend_cents = excluded.stipend_cents,
                pay_freq = excluded.pay_freq,
                start_date = excluded.start_date,
                in_office_days = excluded.in_office_days,
                food_cost_cents = excluded.food_cost_cents,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                profile.home_addr,
                profile.office_addr,
                profile.city,
                profile.state,
                profile.hourly_cents,
                profile.hours_per_week,
                profile.stipend_cents,
                profile.pay_freq.as_str(),
                profile.start_date.map(format_date),
                profile.in_office_days,
                profile.food_cost_cents,
            ],
        )?;
        Ok(())
    }

    /// Commute log, oldest first
    pub fn list_commutes(&self) -> Result<Vec<CommuteEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, date, from_addr, to_addr, cost_cents, method FROM commutes ORDER BY date, id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(1)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    date,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, date, from, to, cost_cents, method)| {
                let date = parse_date(&date).ok_or_else(|| {
                    Error::InvalidInput(format!("commute {} has invalid date: {}", id, date))
                })?;
                Ok(CommuteEntry {
                    id,
                    date,
                    from,
                    to,
                    cost_cents,
                    method,
                })
            })
            .collect()
    }

    pub fn add_commute(&self, entry: NewCommuteEntry) -> Result<CommuteEntry> {
        if entry.cost_cents < 0 {
            return Err(Error::InvalidInput(format!(
                "commute cost must not be negative: {}",
                entry.cost_cents
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO commutes (date, from_addr, to_addr, cost_cents, method) VALUES (?, ?, ?, ?, ?)",
            params![
                format_date(entry.date),
                entry.from,
                entry.to,
                entry.cost_cents,
                entry.method,
            ],
        )?;

        Ok(CommuteEntry {
            id: conn.last_insert_rowid(),
            date: entry.date,
            from: entry.from,
            to: entry.to,
            cost_cents: entry.cost_cents,
            method: entry.method,
        })
    }
}
