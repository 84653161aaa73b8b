// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::positions::{compute_holdings, mark_prices};
use crate::models::Holding;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let account_name = m.get_one::<String>("account").unwrap().trim();
    let holdings = account_holdings(conn, account_name)?;

    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &holdings)? {
        return Ok(());
    }
    let rows = holdings
        .into_iter()
        .map(|h| {
            vec![
                h.symbol.clone(),
                h.name.clone(),
                format!("{:.4}", h.quantity),
                format!("{:.2}", h.average_price),
                format!("{:.2}", h.current_price),
                format!("{:.2}", h.market_value()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Symbol", "Name", "Qty", "Avg Cost", "Mark", "Value"], rows)
    );
    Ok(())
}

/// Replay the account's ledger and apply any stored price marks.
pub fn account_holdings(conn: &Connection, account_name: &str) -> Result<Vec<Holding>> {
    let account = db::account_by_name(conn, account_name)?;
    let transactions = db::load_transactions(conn)?;
    let mut holdings = compute_holdings(&account.id, &transactions);
    mark_prices(&mut holdings, &db::latest_marks(conn)?);
    Ok(holdings)
}
