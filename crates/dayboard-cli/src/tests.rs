//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use dayboard_core::db::Database;
use dayboard_core::models::{PayFrequency, SubscriptionSource};
use dayboard_core::store::Repository;
use dayboard_core::tax_tables::TaxTables;

use crate::cli::PayArgs;
use crate::commands::{
    self, format_bps, format_cents, parse_date_arg, parse_dollars_arg, truncate, Backend,
    CommuteArgs, ProfileUpdate,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_test_backend() -> Backend {
    let db = Database::in_memory().unwrap();
    db.load_tax_tables(&TaxTables::embedded().unwrap()).unwrap();
    Backend::Db(db)
}

fn demo_backend() -> Backend {
    Backend::demo(TaxTables::embedded().unwrap(), date(2024, 6, 14)).unwrap()
}

fn pay_args(income: Option<&str>) -> PayArgs {
    PayArgs {
        income: income.map(str::to_string),
        filing_status: "single".into(),
        pay_freq: None,
        term_weeks: 12,
        year: None,
        strict: false,
    }
}

const HISTORY_CSV: &str = "\
date,merchant_name,amount,pending
2024-01-05,Netflix,15.99,false
2024-02-04,Netflix,15.99,false
2024-03-05,Netflix,15.99,false
2024-01-20,Kroger,54.10,false
2024-02-27,Kroger,12.00,false
";

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 20), "Netflix");
    assert_eq!(truncate("A very long merchant name", 10), "A very ...");
    assert_eq!(truncate("Café Crème Brûlée", 8), "Café ...");
}

#[test]
fn test_format_cents() {
    assert_eq!(format_cents(0), "$0.00");
    assert_eq!(format_cents(1599), "$15.99");
    assert_eq!(format_cents(-1205), "-$12.05");
    assert_eq!(format_cents(5_200_000), "$52000.00");
}

#[test]
fn test_format_bps() {
    assert_eq!(format_bps(930), "9.30%");
    assert_eq!(format_bps(765), "7.65%");
    assert_eq!(format_bps(0), "0.00%");
    assert_eq!(format_bps(-50), "-0.50%");
    assert_eq!(format_bps(-1205), "-12.05%");
}

#[test]
fn test_parse_dollars_arg() {
    assert_eq!(parse_dollars_arg("income", "52000").unwrap(), 5_200_000);
    assert_eq!(parse_dollars_arg("income", "$52,000.50").unwrap(), 5_200_050);

    let err = parse_dollars_arg("income", "lots").unwrap_err();
    assert!(err.to_string().contains("Invalid income amount"));
}

#[test]
fn test_parse_date_arg() {
    assert_eq!(parse_date_arg("date", None).unwrap(), None);
    assert_eq!(
        parse_date_arg("date", Some("2024-06-14")).unwrap(),
        Some(date(2024, 6, 14))
    );

    let err = parse_date_arg("next-due", Some("06/14/2024")).unwrap_err();
    assert!(err.to_string().contains("--next-due"));
}

// ========== Backend Tests ==========

#[test]
fn test_demo_backend_is_seeded() {
    let backend = demo_backend();
    assert!(backend.is_demo());

    let subs = backend.repo().list_active_subscriptions().unwrap();
    assert_eq!(subs.len(), 3);
    assert_eq!(backend.latest_tax_year().unwrap(), Some(2024));
    assert_eq!(
        backend.known_states(2024).unwrap(),
        vec!["IN", "TX", "WA"]
    );
}

#[test]
fn test_db_backend_starts_empty() {
    let backend = setup_test_backend();
    assert!(!backend.is_demo());
    assert!(backend.repo().list_active_subscriptions().unwrap().is_empty());
    assert!(backend.repo().get_profile().unwrap().is_none());
    assert_eq!(backend.latest_tax_year().unwrap(), Some(2024));
}

#[test]
fn test_cmd_init_loads_tables() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dayboard.db");

    commands::cmd_init(&db_path, None).unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert!(db.has_tax_tables().unwrap());
    assert_eq!(db.latest_tax_year().unwrap(), Some(2024));
}

// ========== Tax Command Tests ==========

#[test]
fn test_resolve_pay_from_arguments() {
    let backend = setup_test_backend();
    let mut pay = pay_args(Some("50000"));
    pay.pay_freq = Some("weekly".into());

    let resolved = commands::resolve_pay(&backend, &pay, Some("in")).unwrap();
    assert_eq!(resolved.year, 2024);
    assert_eq!(resolved.profile.annual_income_cents, 5_000_000);
    assert_eq!(resolved.profile.state, "IN");
    assert_eq!(resolved.profile.pay_frequency, PayFrequency::Weekly);
}

#[test]
fn test_resolve_pay_falls_back_to_profile() {
    let backend = demo_backend();

    let resolved = commands::resolve_pay(&backend, &pay_args(None), None).unwrap();
    // $25/hr × 40 hrs × 52 weeks
    assert_eq!(resolved.profile.annual_income_cents, 5_200_000);
    assert_eq!(resolved.profile.state, "IN");
    assert_eq!(resolved.profile.pay_frequency, PayFrequency::Biweekly);
}

#[test]
fn test_resolve_pay_without_income_fails() {
    let backend = setup_test_backend();
    let err = commands::resolve_pay(&backend, &pay_args(None), None).unwrap_err();
    assert!(err.to_string().contains("No income given"));
}

#[test]
fn test_estimate_matches_core() {
    let backend = setup_test_backend();
    let mut pay = pay_args(Some("50000"));
    pay.year = Some(2023);

    let resolved = commands::resolve_pay(&backend, &pay, Some("IN")).unwrap();
    let result = commands::estimate(&backend, &resolved, &pay).unwrap();
    assert_eq!(result.fica_cents, 382_500);
    assert!(result.federal_cents > 0);
    assert!(result.state_cents > 0);
    assert_eq!(
        result.term_net_cents,
        5_000_000 - result.total_tax_cents()
    );
}

#[test]
fn test_cmd_tax_unknown_state_strict() {
    let backend = setup_test_backend();
    let mut pay = pay_args(Some("50000"));

    assert!(commands::cmd_tax(&backend, &pay, Some("ZZ"), false, false).is_ok());

    pay.strict = true;
    let err = commands::cmd_tax(&backend, &pay, Some("ZZ"), false, false).unwrap_err();
    assert!(err.to_string().contains("ZZ"));
}

#[test]
fn test_cmd_tax_rejects_married() {
    let backend = setup_test_backend();
    let mut pay = pay_args(Some("50000"));
    pay.filing_status = "married".into();

    assert!(commands::cmd_tax(&backend, &pay, Some("IN"), false, false).is_err());
}

#[test]
fn test_cmd_tax_breakdown_and_json() {
    let backend = demo_backend();
    let pay = pay_args(None);
    assert!(commands::cmd_tax(&backend, &pay, None, true, false).is_ok());
    assert!(commands::cmd_tax(&backend, &pay, None, false, true).is_ok());
}

#[test]
fn test_cmd_compare_states() {
    let backend = setup_test_backend();
    let pay = pay_args(Some("52000"));

    assert!(commands::cmd_compare_states(&backend, &pay, &[], false).is_ok());
    assert!(commands::cmd_compare_states(
        &backend,
        &pay,
        &["TX".to_string(), "IN".to_string()],
        true
    )
    .is_ok());
}

#[test]
fn test_cmd_compare_states_without_tables_for_year() {
    let backend = setup_test_backend();
    let mut pay = pay_args(Some("52000"));
    pay.year = Some(1999);

    assert!(commands::cmd_compare_states(&backend, &pay, &[], false).is_err());
}

#[test]
fn test_cmd_compare_housing() {
    let backend = setup_test_backend();
    let mut pay = pay_args(Some("52000"));
    pay.year = Some(2023);

    assert!(commands::cmd_compare_housing(&backend, &pay, None, false).is_ok());
    assert!(commands::cmd_compare_housing(&backend, &pay, None, true).is_ok());
}

#[test]
fn test_cmd_compare_housing_custom_markets() {
    let backend = setup_test_backend();
    let pay = pay_args(Some("52000"));

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        b"[[market]]\ncity = \"Austin\"\nstate = \"TX\"\navg_rent_cents = 180000\n",
    )
    .unwrap();
    assert!(commands::cmd_compare_housing(&backend, &pay, Some(file.path()), false).is_ok());

    // Only markets in states without a table for the year
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        b"[[market]]\ncity = \"Raleigh\"\nstate = \"NC\"\navg_rent_cents = 140000\n",
    )
    .unwrap();
    let err = commands::cmd_compare_housing(&backend, &pay, Some(file.path()), false)
        .unwrap_err();
    assert!(err.to_string().contains("No housing market"));
}

// ========== Detect Command Tests ==========

#[test]
fn test_load_transactions_csv() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(HISTORY_CSV.as_bytes()).unwrap();

    let txns = commands::load_transactions(file.path()).unwrap();
    assert_eq!(txns.len(), 5);
    assert_eq!(txns[0].amount_cents, 1599);
}

#[test]
fn test_load_transactions_json() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(
        br#"{"transactions": [
            {"transaction_id": "t1", "account_id": "a1", "amount": 9.99,
             "date": "2024-01-01", "name": "SPOTIFY USA", "merchant_name": "Spotify",
             "pending": false, "category": ["Service"]}
        ]}"#,
    )
    .unwrap();

    let txns = commands::load_transactions(file.path()).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].merchant_name, "Spotify");
    assert_eq!(txns[0].amount_cents, 999);
}

#[test]
fn test_load_transactions_bad_csv() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(b"when,who\n2024-01-01,Netflix\n").unwrap();

    let err = commands::load_transactions(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("expected columns"));
}

#[test]
fn test_cmd_detect_save_is_idempotent() {
    let backend = setup_test_backend();
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(HISTORY_CSV.as_bytes()).unwrap();

    commands::cmd_detect(&backend, Some(file.path()), true, 2, 5, false).unwrap();
    commands::cmd_detect(&backend, Some(file.path()), true, 2, 5, true).unwrap();

    let subs = backend.repo().list_active_subscriptions().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].merchant, "Netflix");
    assert_eq!(subs[0].source, SubscriptionSource::Detected);
    assert_eq!(subs[0].next_due, Some(date(2024, 4, 4)));
}

#[test]
fn test_cmd_detect_requires_file_outside_demo() {
    let backend = setup_test_backend();
    assert!(commands::cmd_detect(&backend, None, false, 2, 5, false).is_err());

    let demo = demo_backend();
    assert!(commands::cmd_detect(&demo, None, false, 2, 5, false).is_ok());
}

// ========== Subscriptions Command Tests ==========

#[test]
fn test_cmd_subscriptions_add_and_delete() {
    let backend = setup_test_backend();

    commands::cmd_subscriptions_add(&backend, " Spotify ", "9.99", 30, Some("2024-07-01"))
        .unwrap();

    let subs = backend.repo().list_active_subscriptions().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].merchant, "Spotify");
    assert_eq!(subs[0].amount_cents, 999);
    assert_eq!(subs[0].source, SubscriptionSource::Manual);
    assert_eq!(subs[0].next_due, Some(date(2024, 7, 1)));

    assert!(commands::cmd_subscriptions_list(&backend).is_ok());

    commands::cmd_subscriptions_delete(&backend, subs[0].id).unwrap();
    assert!(backend.repo().list_active_subscriptions().unwrap().is_empty());
}

#[test]
fn test_cmd_subscriptions_add_invalid() {
    let backend = setup_test_backend();
    assert!(commands::cmd_subscriptions_add(&backend, "Spotify", "0", 30, None).is_err());
    assert!(commands::cmd_subscriptions_add(&backend, "Spotify", "9.99", 0, None).is_err());
    assert!(commands::cmd_subscriptions_add(&backend, "", "9.99", 30, None).is_err());
}

#[test]
fn test_cmd_subscriptions_delete_missing() {
    let backend = setup_test_backend();
    let err = commands::cmd_subscriptions_delete(&backend, 999).unwrap_err();
    assert!(err.to_string().contains("Subscription not found"));
}

#[test]
fn test_cmd_subscriptions_list_empty() {
    let backend = setup_test_backend();
    assert!(commands::cmd_subscriptions_list(&backend).is_ok());
}

// ========== Profile Command Tests ==========

#[test]
fn test_cmd_profile_set_merges() {
    let backend = setup_test_backend();

    commands::cmd_profile_set(
        &backend,
        ProfileUpdate {
            state: Some("ca".into()),
            hourly: Some("30".into()),
            hours_per_week: Some(40),
            pay_freq: Some("weekly".into()),
            ..Default::default()
        },
    )
    .unwrap();

    commands::cmd_profile_set(
        &backend,
        ProfileUpdate {
            city: Some("San Francisco".into()),
            food: Some("15".into()),
            start_date: Some("2024-06-03".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let profile = backend.repo().get_profile().unwrap().unwrap();
    assert_eq!(profile.state, "CA");
    assert_eq!(profile.city, "San Francisco");
    assert_eq!(profile.hourly_cents, Some(3000));
    assert_eq!(profile.pay_freq, PayFrequency::Weekly);
    assert_eq!(profile.food_cost_cents, 1500);
    assert_eq!(profile.start_date, Some(date(2024, 6, 3)));

    assert!(commands::cmd_profile_show(&backend).is_ok());
}

#[test]
fn test_cmd_profile_set_rejects_bad_values() {
    let backend = setup_test_backend();

    let bad_state = ProfileUpdate {
        state: Some("Indiana".into()),
        ..Default::default()
    };
    assert!(commands::cmd_profile_set(&backend, bad_state).is_err());

    let bad_days = ProfileUpdate {
        in_office_days: Some(9),
        ..Default::default()
    };
    assert!(commands::cmd_profile_set(&backend, bad_days).is_err());

    assert!(backend.repo().get_profile().unwrap().is_none());
}

#[test]
fn test_cmd_profile_show_empty() {
    let backend = setup_test_backend();
    assert!(commands::cmd_profile_show(&backend).is_ok());
}

// ========== Commute and Burn Command Tests ==========

fn commute_args(log: bool, cost: Option<&str>) -> CommuteArgs {
    CommuteArgs {
        miles: 5.0,
        minutes: 15.0,
        surge: 1.5,
        log,
        cost: cost.map(str::to_string),
        from: "Home".into(),
        to: "Office".into(),
        method: "Uber".into(),
        date: Some("2024-06-14".into()),
    }
}

#[test]
fn test_cmd_commute_estimate_only() {
    let backend = setup_test_backend();
    commands::cmd_commute(&backend, commute_args(false, None)).unwrap();
    assert!(backend.repo().list_commutes().unwrap().is_empty());
}

#[test]
fn test_cmd_commute_logs_low_estimate() {
    let backend = setup_test_backend();
    commands::cmd_commute(&backend, commute_args(true, None)).unwrap();

    let commutes = backend.repo().list_commutes().unwrap();
    assert_eq!(commutes.len(), 1);
    // 200 + 150 × 5 + 25 × 15
    assert_eq!(commutes[0].cost_cents, 1325);
    assert_eq!(commutes[0].date, date(2024, 6, 14));
}

#[test]
fn test_cmd_commute_logs_given_cost() {
    let backend = setup_test_backend();
    commands::cmd_commute(&backend, commute_args(true, Some("18.40"))).unwrap();

    let commutes = backend.repo().list_commutes().unwrap();
    assert_eq!(commutes[0].cost_cents, 1840);
    assert_eq!(commutes[0].method, "Uber");
}

#[test]
fn test_cmd_commute_rejects_negative_distance() {
    let backend = setup_test_backend();
    let mut args = commute_args(true, None);
    args.miles = -1.0;
    assert!(commands::cmd_commute(&backend, args).is_err());
    assert!(backend.repo().list_commutes().unwrap().is_empty());
}

#[test]
fn test_cmd_burn() {
    let backend = demo_backend();
    assert!(commands::cmd_burn(&backend, Some("2024-06-14"), false).is_ok());
    assert!(commands::cmd_burn(&backend, Some("2024-06-14"), true).is_ok());
    assert!(commands::cmd_burn(&backend, Some("June 14"), false).is_err());
}
