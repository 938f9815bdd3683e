//! DayBoard CLI - Take-home pay and recurring spend for interns
//!
//! Usage:
//!   dayboard init                          Initialize database and tax tables
//!   dayboard tax --income 52000 -s CA      Estimate taxes and paychecks
//!   dayboard compare-housing --year 2023   Net pay after rent by city
//!   dayboard detect --file history.csv     Find recurring charges
//!   dayboard --demo burn                   Today's spend with demo data

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    if let Commands::Init = cli.command {
        return commands::cmd_init(&cli.db, cli.tax_tables.as_deref());
    }

    let backend = commands::open_backend(&cli)?;

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Tax {
            pay,
            state,
            breakdown,
            json,
        } => commands::cmd_tax(&backend, &pay, state.as_deref(), breakdown, json),
        Commands::CompareStates { pay, states, json } => {
            commands::cmd_compare_states(&backend, &pay, &states, json)
        }
        Commands::CompareHousing { pay, housing, json } => {
            commands::cmd_compare_housing(&backend, &pay, housing.as_deref(), json)
        }
        Commands::Detect {
            file,
            save,
            min_occurrences,
            tolerance,
            json,
        } => commands::cmd_detect(
            &backend,
            file.as_deref(),
            save,
            min_occurrences,
            tolerance,
            json,
        ),
        Commands::Subscriptions { action } => match action {
            None | Some(SubscriptionsAction::List) => commands::cmd_subscriptions_list(&backend),
            Some(SubscriptionsAction::Add {
                merchant,
                amount,
                cadence_days,
                next_due,
            }) => commands::cmd_subscriptions_add(
                &backend,
                &merchant,
                &amount,
                cadence_days,
                next_due.as_deref(),
            ),
            Some(SubscriptionsAction::Delete { id }) => {
                commands::cmd_subscriptions_delete(&backend, id)
            }
        },
        Commands::Profile { action } => match action {
            None | Some(ProfileAction::Show) => commands::cmd_profile_show(&backend),
            Some(ProfileAction::Set {
                home_addr,
                office_addr,
                city,
                state,
                hourly,
                hours_per_week,
                stipend,
                pay_freq,
                start_date,
                in_office_days,
                food,
            }) => commands::cmd_profile_set(
                &backend,
                commands::ProfileUpdate {
                    home_addr,
                    office_addr,
                    city,
                    state,
                    hourly,
                    hours_per_week,
                    stipend,
                    pay_freq,
                    start_date,
                    in_office_days,
                    food,
                },
            ),
        },
        Commands::Commute {
            miles,
            minutes,
            surge,
            log,
            cost,
            from,
            to,
            method,
            date,
        } => commands::cmd_commute(
            &backend,
            commands::CommuteArgs {
                miles,
                minutes,
                surge,
                log,
                cost,
                from,
                to,
                method,
                date,
            },
        ),
        Commands::Burn { date, json } => commands::cmd_burn(&backend, date.as_deref(), json),
    }
}
