// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::worth::{allocation, summarize, AllocationSlice, PortfolioSummary};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("allocation", sub)) => allocation_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn compute_summary(conn: &Connection) -> Result<PortfolioSummary> {
    let accounts = db::load_accounts(conn)?;
    let transactions = db::load_transactions(conn)?;
    let marks = db::latest_marks(conn)?;
    Ok(summarize(&accounts, &transactions, &marks))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let s = compute_summary(conn)?;
    if maybe_print_json(sub.get_flag("json"), false, &s)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Total net worth".to_string(), format!("{:.2}", s.total_worth)],
        vec!["Cash".to_string(), format!("{:.2}", s.total_cash)],
        vec!["Invested".to_string(), format!("{:.2}", s.total_invested)],
        vec!["Net deposits".to_string(), format!("{:.2}", s.net_deposits)],
        vec!["Profit".to_string(), format!("{:.2}", s.profit)],
        vec!["Profit %".to_string(), format!("{:.2}", s.profit_pct)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

/// Top-N symbols plus a residual Cash bucket, the shape the allocation
/// chart wants.
pub fn allocation_breakdown(conn: &Connection, top: usize) -> Result<Vec<AllocationSlice>> {
    let accounts = db::load_accounts(conn)?;
    let transactions = db::load_transactions(conn)?;
    let marks = db::latest_marks(conn)?;

    let mut slices = allocation(&accounts, &transactions, &marks);
    slices.truncate(top);

    let total_cash: Decimal = accounts.iter().map(|a| a.cash_balance).sum();
    if total_cash > Decimal::ZERO {
        slices.push(AllocationSlice {
            symbol: "Cash".to_string(),
            market_value: total_cash,
        });
    }
    Ok(slices)
}

fn allocation_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let top = sub.get_one::<usize>("top").copied().unwrap_or(5);
    let slices = allocation_breakdown(conn, top)?;
    if maybe_print_json(sub.get_flag("json"), false, &slices)? {
        return Ok(());
    }
    let rows = slices
        .into_iter()
        .map(|s| vec![s.symbol, format!("{:.2}", s.market_value)])
        .collect();
    println!("{}", pretty_table(&["Symbol", "Value"], rows));
    Ok(())
}
