//! Stored bracket tables

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::Database;
use crate::error::Result;
use crate::models::Bracket;
use crate::tax_tables::{state_key, BracketTable, FederalTable, TaxTableProvider, TaxTables};

fn read_brackets(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Bracket>> {
    let mut stmt = conn.prepare(sql)?;
    let brackets = stmt
        .query_map(args, |row| {
            Ok(Bracket::new(row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(brackets)
}

impl Database {
    /// Replace stored tables with every table in `tables`
    ///
    /// Years and states not present in `tables` are left alone.
    /// Returns the number of tables written.
    pub fn load_tax_tables(&self, tables: &TaxTables) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut written = 0;

        for (year, federal) in tables.federal_tables() {
            tx.execute("DELETE FROM tax_years WHERE year = ?", params![year])?;
            tx.execute(
                "INSERT INTO tax_years (year, standard_deduction_single_cents) VALUES (?, ?)",
                params![year, federal.standard_deduction_single_cents],
            )?;
            for b in federal.brackets.brackets() {
                tx.execute(
                    "INSERT INTO tax_tables_federal (year, low_cents, high_cents, rate_bps) VALUES (?, ?, ?, ?)",
                    params![year, b.low_cents, b.high_cents, b.rate_bps],
                )?;
            }
            written += 1;
        }

        for (year, state, table) in tables.state_tables() {
            tx.execute(
                "DELETE FROM tax_states WHERE year = ? AND state = ?",
                params![year, state],
            )?;
            tx.execute(
                "INSERT INTO tax_states (year, state) VALUES (?, ?)",
                params![year, state],
            )?;
            for b in table.brackets() {
                tx.execute(
                    "INSERT INTO tax_tables_state (year, state, low_cents, high_cents, rate_bps) VALUES (?, ?, ?, ?, ?)",
                    params![year, state, b.low_cents, b.high_cents, b.rate_bps],
                )?;
            }
            written += 1;
        }

        tx.commit()?;
        info!("Loaded {} tax tables into {}", written, self.path());
        Ok(written)
    }

    /// True once any federal table has been stored
    pub fn has_tax_tables(&self) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tax_years", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Most recent year with a federal table
    pub fn latest_tax_year(&self) -> Result<Option<i32>> {
        let conn = self.conn()?;
        let year: Option<i32> =
            conn.query_row("SELECT MAX(year) FROM tax_years", [], |row| row.get(0))?;
        Ok(year)
    }

    /// State codes known for a year, ascending
    pub fn tax_states(&self, year: i32) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT state FROM tax_states WHERE year = ? ORDER BY state")?;
        let states = stmt
            .query_map(params![year], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(states)
    }
}

impl TaxTableProvider for Database {
    fn federal(&self, year: i32) -> Result<Option<FederalTable>> {
        let conn = self.conn()?;
        let deduction: Option<i64> = conn
            .query_row(
                "SELECT standard_deduction_single_cents FROM tax_years WHERE year = ?",
                params![year],
                |row| row.get(0),
            )
            .optional()?;

        let Some(standard_deduction_single_cents) = deduction else {
            return Ok(None);
        };

        let brackets = read_brackets(
            &conn,
            "SELECT low_cents, high_cents, rate_bps FROM tax_tables_federal WHERE year = ? ORDER BY low_cents",
            &[&year],
        )?;

        Ok(Some(FederalTable {
            brackets: BracketTable::new(brackets)?,
            standard_deduction_single_cents,
        }))
    }

    fn state(&self, year: i32, state: &str) -> Result<Option<BracketTable>> {
        let key = state_key(state);
        let conn = self.conn()?;
        let known: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tax_states WHERE year = ? AND state = ?)",
            params![year, key],
            |row| row.get(0),
        )?;
        if !known {
            return Ok(None);
        }

        let brackets = read_brackets(
            &conn,
            "SELECT low_cents, high_cents, rate_bps FROM tax_tables_state WHERE year = ? AND state = ? ORDER BY low_cents",
            &[&year, &key],
        )?;
        Ok(Some(BracketTable::new(brackets)?))
    }
}
