//! Transaction history import (CSV and Plaid-style JSON)

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Columns expected in an import CSV
pub const CSV_HEADERS: [&str; 7] = [
    "id",
    "account_id",
    "date",
    "merchant_name",
    "amount",
    "pending",
    "category",
];

/// Derive a stable id for a transaction that arrived without one
pub fn generate_hash(date: &NaiveDate, merchant: &str, amount_cents: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(merchant.as_bytes());
    hasher.update(amount_cents.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse transactions from CSV with a header row
///
/// Columns are located by header name, so order does not matter.
/// `id`, `account_id`, `pending` and `category` are optional.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = CsvColumns::locate(&headers)?;

    let mut transactions = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result?;
        let txn = columns
            .transaction(&record)
            .map_err(|e| Error::Import(format!("row {}: {}", row, e)))?;
        transactions.push(txn);
    }

    debug!("Parsed {} transactions from CSV", transactions.len());
    Ok(transactions)
}

struct CsvColumns {
    id: Option<usize>,
    account_id: Option<usize>,
    date: usize,
    merchant_name: usize,
    amount: usize,
    pending: Option<usize>,
    category: Option<usize>,
}

impl CsvColumns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("missing CSV column: {}", name)))
        };

        Ok(Self {
            id: find("id"),
            account_id: find("account_id"),
            date: require("date")?,
            merchant_name: require("merchant_name")?,
            amount: require("amount")?,
            pending: find("pending"),
            category: find("category"),
        })
    }

    fn transaction(&self, record: &StringRecord) -> Result<Transaction> {
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let date = parse_date(field(Some(self.date)))?;
        let merchant_name = field(Some(self.merchant_name)).to_string();
        let amount_cents = parse_dollars(field(Some(self.amount)))?;
        let pending = parse_pending(field(self.pending))?;
        let category = field(self.category)
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();

        let id = match field(self.id) {
            "" => generate_hash(&date, &merchant_name, amount_cents),
            id => id.to_string(),
        };

        Ok(Transaction {
            id,
            account_id: field(self.account_id).to_string(),
            amount_cents,
            date,
            merchant_name,
            pending,
            category,
        })
    }
}

/// One transaction in a Plaid `/transactions/get` payload
#[derive(Debug, Deserialize)]
struct PlaidTransaction {
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    account_id: String,
    amount: f64,
    date: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    merchant_name: Option<String>,
    #[serde(default)]
    pending: bool,
    #[serde(default)]
    category: Option<Vec<String>>,
}

/// Either a bare array or a response object with a `transactions` field
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlaidPayload {
    List(Vec<PlaidTransaction>),
    Response { transactions: Vec<PlaidTransaction> },
}

/// Parse transactions from Plaid-style JSON
///
/// Amounts are dollars with Plaid's sign convention (positive = spent).
/// A blank `merchant_name` falls back to `name`.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let payload: PlaidPayload = serde_json::from_reader(reader)?;
    let raw = match payload {
        PlaidPayload::List(list) => list,
        PlaidPayload::Response { transactions } => transactions,
    };

    let mut transactions = Vec::with_capacity(raw.len());
    for (i, txn) in raw.into_iter().enumerate() {
        let row = i + 1;
        let parsed = plaid_to_transaction(txn)
            .map_err(|e| Error::Import(format!("row {}: {}", row, e)))?;
        transactions.push(parsed);
    }

    debug!("Parsed {} transactions from JSON", transactions.len());
    Ok(transactions)
}

fn plaid_to_transaction(txn: PlaidTransaction) -> Result<Transaction> {
    let date = parse_date(&txn.date)?;
    let amount_cents = dollars_to_cents(txn.amount)?;
    let merchant_name = txn
        .merchant_name
        .filter(|m| !m.trim().is_empty())
        .or(txn.name)
        .unwrap_or_default();

    let id = match txn.transaction_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => generate_hash(&date, &merchant_name, amount_cents),
    };

    Ok(Transaction {
        id,
        account_id: txn.account_id,
        amount_cents,
        date,
        merchant_name,
        pending: txn.pending,
        category: txn.category.unwrap_or_default(),
    })
}

/// Parse a date (ISO or US month/day/year)
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse a dollar amount string into cents, handling currency symbols and commas
pub fn parse_dollars(s: &str) -> Result<i64> {
    let cleaned: String = s.trim().replace(['$', ',', ' '], "");

    let dollars = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;
    dollars_to_cents(dollars)
}

fn dollars_to_cents(dollars: f64) -> Result<i64> {
    if !dollars.is_finite() {
        return Err(Error::Import(format!("Unable to parse amount: {}", dollars)));
    }
    let cents = (dollars * 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if cents < i64::MIN as f64 || cents >= i64::MAX as f64 {
        return Err(Error::Import(format!("amount out of range: {}", dollars)));
    }
    Ok(cents as i64)
}

fn parse_pending(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        other => Err(Error::Import(format!("Unable to parse pending flag: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date("01/15/2024").unwrap(), date(2024, 1, 15));
        assert!(parse_date("15 Jan 2024").is_err());
    }

    #[test]
    fn test_parse_dollars() {
        assert_eq!(parse_dollars("9.99").unwrap(), 999);
        assert_eq!(parse_dollars("$1,234.56").unwrap(), 123_456);
        assert_eq!(parse_dollars("-25.00").unwrap(), -2500);
        assert_eq!(parse_dollars("0.1").unwrap(), 10);
        assert!(parse_dollars("abc").is_err());
        assert!(parse_dollars("inf").is_err());
    }

    #[test]
    fn test_parse_dollars_out_of_range() {
        assert_eq!(
            parse_dollars("90,000,000,000,000,000").unwrap(),
            9_000_000_000_000_000_000
        );

        for huge in ["1e30", "-1e30", "100000000000000000", "92233720368547758.08"] {
            let err = parse_dollars(huge).unwrap_err();
            assert!(matches!(err, Error::Import(_)), "{}", huge);
            assert!(err.to_string().contains("out of range"), "{}", huge);
        }

        let data = "date,merchant_name,amount\n2024-01-01,Whale,1e30\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_parse_csv() {
        let data = "\
id,account_id,date,merchant_name,amount,pending,category
t1,acc,2024-01-01,Spotify,9.99,false,Entertainment;Music
,acc,01/31/2024,Spotify,$9.99,,
t3,acc,2024-03-01,Spotify,9.99,1,
";
        let txns = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].id, "t1");
        assert_eq!(txns[0].amount_cents, 999);
        assert_eq!(txns[0].category, vec!["Entertainment", "Music"]);
        assert!(!txns[0].pending);

        assert_eq!(txns[1].date, date(2024, 1, 31));
        assert_eq!(txns[1].id, generate_hash(&date(2024, 1, 31), "Spotify", 999));
        assert_eq!(txns[1].id.len(), 64);
        assert!(txns[1].category.is_empty());

        assert!(txns[2].pending);
    }

    #[test]
    fn test_parse_csv_column_order_and_optional_columns() {
        let data = "amount,merchant_name,date\n15.99,Netflix,2024-02-01\n";
        let txns = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txns[0].merchant_name, "Netflix");
        assert_eq!(txns[0].amount_cents, 1599);
        assert_eq!(txns[0].account_id, "");
    }

    #[test]
    fn test_parse_csv_reports_row() {
        let data = "date,merchant_name,amount\n2024-01-01,A,1.00\n2024-01-02,B,oops\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let err = parse_csv("date,amount\n2024-01-01,1.00\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("merchant_name"));
    }

    #[test]
    fn test_parse_json_array() {
        let data = r#"[
            {"transaction_id": "p1", "account_id": "a", "amount": 15.99, "date": "2024-01-05",
             "name": "NETFLIX.COM", "merchant_name": "Netflix", "category": ["Service"], "pending": false},
            {"account_id": "a", "amount": -200.0, "date": "2024-01-06", "name": "Payroll", "merchant_name": ""}
        ]"#;
        let txns = parse_json(data.as_bytes()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].id, "p1");
        assert_eq!(txns[0].merchant_name, "Netflix");
        assert_eq!(txns[0].category, vec!["Service"]);
        assert_eq!(txns[1].merchant_name, "Payroll");
        assert_eq!(txns[1].amount_cents, -20_000);
        assert_eq!(txns[1].id.len(), 64);
    }

    #[test]
    fn test_parse_json_response_object() {
        let data = r#"{"transactions": [{"transaction_id": "x", "amount": 4.5, "date": "2024-05-01", "name": "Cafe"}], "total_transactions": 1}"#;
        let txns = parse_json(data.as_bytes()).unwrap();
        assert_eq!(txns[0].amount_cents, 450);
        assert_eq!(txns[0].merchant_name, "Cafe");
    }

    #[test]
    fn test_parse_json_bad_date_reports_row() {
        let data = r#"[{"amount": 1.0, "date": "2024-01-01"}, {"amount": 1.0, "date": "nope"}]"#;
        let err = parse_json(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_generate_hash_is_stable() {
        let d = date(2024, 1, 1);
        assert_eq!(generate_hash(&d, "A", 100), generate_hash(&d, "A", 100));
        assert_ne!(generate_hash(&d, "A", 100), generate_hash(&d, "A", 101));
    }
}
