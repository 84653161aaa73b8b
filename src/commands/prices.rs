// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::positions::compute_holdings;
use crate::utils::{http_client, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;

const QUOTE_ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set_price(conn, sub),
        Some(("fetch", _)) => fetch_prices(conn),
        Some(("list", _)) => list_prices(conn),
        _ => Ok(()),
    }
}

fn set_price(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = sub.get_one::<String>("symbol").unwrap().trim().to_uppercase();
    let price = parse_decimal(sub.get_one::<String>("price").unwrap().trim())?;
    let as_of = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw.trim())?.to_string(),
        None => Utc::now().date_naive().to_string(),
    };
    db::insert_price(conn, &symbol, &as_of, price, "manual")?;
    println!("Marked {} at {} as of {}", symbol, price, as_of);
    Ok(())
}

fn list_prices(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT symbol, as_of, price, source FROM prices ORDER BY as_of DESC, id DESC LIMIT 50",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(vec![
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ])
    })?;
    let data = rows.collect::<Result<Vec<_>, _>>()?;
    println!("{}", pretty_table(&["Symbol", "As Of", "Price", "Source"], data));
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct YahooQuote {
    pub symbol: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
    #[serde(rename = "trailingAnnualDividendRate")]
    pub trailing_annual_dividend_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    result: Vec<YahooQuote>,
}

pub fn fetch_quotes(symbols: &[&str]) -> Result<Vec<YahooQuote>> {
    let url = format!("{}?symbols={}", QUOTE_ENDPOINT, symbols.join(","));
    let envelope: QuoteEnvelope = http_client()?
        .get(url)
        .send()?
        .error_for_status()?
        .json()?;
    Ok(envelope.quote_response.result)
}

/// Symbols currently held in any account.
fn held_symbols(conn: &Connection) -> Result<BTreeSet<String>> {
    let accounts = db::load_accounts(conn)?;
    let transactions = db::load_transactions(conn)?;
    let mut symbols = BTreeSet::new();
    for acc in &accounts {
        for h in compute_holdings(&acc.id, &transactions) {
            symbols.insert(h.symbol);
        }
    }
    Ok(symbols)
}

fn fetch_prices(conn: &mut Connection) -> Result<()> {
    let symbols = held_symbols(conn)?;
    if symbols.is_empty() {
        println!("No held symbols to fetch");
        return Ok(());
    }
    let wanted: Vec<&str> = symbols.iter().map(String::as_str).collect();

    // Quotes missing a symbol or a price (delisted, halted) are dropped.
    let updates: Vec<(String, Decimal)> = fetch_quotes(&wanted)?
        .into_iter()
        .filter_map(|q| {
            let sym = q.symbol?;
            let px = Decimal::from_f64_retain(q.regular_market_price?)?;
            symbols.contains(&sym).then_some((sym, px))
        })
        .collect();

    if updates.is_empty() {
        println!("No usable quotes came back");
        return Ok(());
    }

    let as_of = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    for (symbol, price) in &updates {
        db::insert_price(&tx, symbol, &as_of, *price, "yahoo")?;
    }
    tx.commit()?;
    println!("Stored {} Yahoo marks as of {}", updates.len(), as_of);
    Ok(())
}
