// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rust_decimal::Decimal;

const UA: &str = concat!(
    "folio/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/folio)"
);

const HTTP_TIMEOUT_SECS: u64 = 15;

pub fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(UA)
        .build()
        .context("Build HTTP client")
}

/// Opaque string id for new entities (accounts, ledger entries, dividends).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Exact decimal parse; input with more precision than Decimal can hold is
/// an error, never silently rounded.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str_exact(s).with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(amount: Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, amount)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table.add_rows(rows);
    table
}

/// Machine-readable output escape hatch shared by the list-style commands.
/// Returns whether anything was printed; callers fall back to a table.
pub fn maybe_print_json<T: serde::Serialize>(json: bool, jsonl: bool, v: &T) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(v)?);
    } else if jsonl {
        match serde_json::to_value(v)? {
            serde_json::Value::Array(items) => {
                for item in items {
                    println!("{}", serde_json::to_string(&item)?);
                }
            }
            other => println!("{}", serde_json::to_string(&other)?),
        }
    } else {
        return Ok(false);
    }
    Ok(true)
}
