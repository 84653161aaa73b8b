// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::prices::fetch_quotes;
use crate::db;
use crate::ledger::dividends::{generate_schedule, toggle_received, total_projected, total_received};
use crate::ledger::positions::compute_holdings;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("generate", sub)) => generate(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("toggle", sub)) => toggle(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn generate(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = sub.get_one::<String>("symbol").unwrap().trim().to_uppercase();
    let account_name = sub.get_one::<String>("account").unwrap().trim();
    let as_of = match sub.get_one::<String>("as-of") {
        Some(raw) => parse_date(raw.trim())?,
        None => Utc::now().date_naive(),
    };

    let account = db::account_by_name(conn, account_name)?;
    let transactions = db::load_transactions(conn)?;
    let holdings = compute_holdings(&account.id, &transactions);
    let holding = holdings
        .iter()
        .find(|h| h.symbol == symbol)
        .with_context(|| format!("No holding of {} in account '{}'", symbol, account_name))?;

    let annual = match (sub.get_one::<String>("annual"), sub.get_flag("live")) {
        (Some(raw), _) => parse_decimal(raw.trim())?,
        (None, true) => match lookup_annual_estimate(&symbol)? {
            Some(rate) => rate,
            None => {
                // Lookup unavailable: skip generation rather than guessing.
                println!("No dividend estimate available for {}; nothing generated", symbol);
                return Ok(());
            }
        },
        (None, false) => return Err(anyhow!("Provide --annual or --live")),
    };

    let schedule = generate_schedule(&symbol, &account.id, annual, holding.quantity, as_of);
    if schedule.is_empty() {
        println!("{} pays no dividend; nothing generated", symbol);
        return Ok(());
    }

    let tx = conn.transaction()?;
    for div in &schedule {
        db::insert_dividend(&tx, div)?;
    }
    tx.commit()?;
    println!(
        "Scheduled {} payments of {:.2} for {} starting {}",
        schedule.len(),
        schedule[0].amount,
        symbol,
        schedule[0].pay_date
    );
    Ok(())
}

/// Trailing annual dividend rate from Yahoo, or None when the quote is
/// missing or carries no rate.
fn lookup_annual_estimate(symbol: &str) -> Result<Option<Decimal>> {
    let quotes = fetch_quotes(&[symbol])?;
    Ok(quotes
        .into_iter()
        .find(|q| q.symbol.as_deref() == Some(symbol))
        .and_then(|q| q.trailing_annual_dividend_rate)
        .and_then(Decimal::from_f64_retain))
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let dividends = db::load_dividends(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dividends)? {
        return Ok(());
    }
    let rows = dividends
        .into_iter()
        .map(|d| {
            vec![
                d.id,
                d.symbol,
                d.pay_date.to_string(),
                format!("{:.2}", d.amount),
                if d.is_received { "received" } else { "projected" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Symbol", "Pay Date", "Amount", "Status"], rows)
    );
    Ok(())
}

fn toggle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let dividends = db::load_dividends(conn)?;
    let toggled = toggle_received(&dividends, id);

    let changed = dividends
        .iter()
        .zip(toggled.iter())
        .find(|(before, after)| before.is_received != after.is_received);
    match changed {
        Some((_, after)) => {
            db::set_dividend_received(conn, &after.id, after.is_received)?;
            println!(
                "{} {} on {} marked {}",
                after.symbol,
                after.amount,
                after.pay_date,
                if after.is_received { "received" } else { "projected" }
            );
        }
        // Unknown id is a no-op, not an error.
        None => println!("No dividend with id '{}'", id),
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let dividends = db::load_dividends(conn)?;
    let received = total_received(&dividends);
    let projected = total_projected(&dividends);
    if sub.get_flag("json") {
        println!(
            "{}",
            serde_json::json!({ "totalReceived": received, "totalProjected": projected })
        );
        return Ok(());
    }
    let rows = vec![
        vec!["Total received".to_string(), format!("{:.2}", received)],
        vec!["Projected (next 12mo)".to_string(), format!("{:.2}", projected)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
