// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::TxType;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashSet;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Ledger entries pointing at accounts that no longer exist
    let mut stmt = conn.prepare(
        "SELECT t.id, t.account_id FROM transactions t
         LEFT JOIN accounts a ON t.account_id=a.id WHERE a.id IS NULL",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let acct: String = r.get(1)?;
        rows.push(vec!["orphaned_transaction".into(), format!("{} -> {}", id, acct)]);
    }

    // 2) Dividends pointing at accounts that no longer exist
    let mut stmt2 = conn.prepare(
        "SELECT d.id, d.account_id FROM dividends d
         LEFT JOIN accounts a ON d.account_id=a.id WHERE a.id IS NULL",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: String = r.get(0)?;
        let acct: String = r.get(1)?;
        rows.push(vec!["orphaned_dividend".into(), format!("{} -> {}", id, acct)]);
    }

    // 3) Structurally malformed entries (should have been rejected at entry)
    let transactions = db::load_transactions(conn)?;
    for tx in &transactions {
        if let Err(e) = tx.validate() {
            rows.push(vec!["malformed_entry".into(), format!("{}: {}", tx.id, e)]);
        }
    }

    // 4) Stored cash vs a full replay of the ledger. Seed balances are
    // recorded as deposits, so the two must agree exactly.
    let accounts = db::load_accounts(conn)?;
    for acc in &accounts {
        let replayed: Decimal = transactions
            .iter()
            .filter(|t| t.account_id == acc.id)
            .map(|t| match t.r#type {
                TxType::Deposit | TxType::Sell => t.total_amount,
                TxType::Withdraw | TxType::Buy => -t.total_amount,
            })
            .sum();
        if replayed != acc.cash_balance {
            rows.push(vec![
                "cash_drift".into(),
                format!("{}: stored {} replayed {}", acc.name, acc.cash_balance, replayed),
            ]);
        }
    }

    // 5) Scheduled dividends for symbols no account holds anymore
    let mut held: HashSet<String> = HashSet::new();
    for acc in &accounts {
        for h in crate::ledger::positions::compute_holdings(&acc.id, &transactions) {
            held.insert(h.symbol);
        }
    }
    for div in db::load_dividends(conn)? {
        if !div.is_received && !held.contains(&div.symbol) {
            rows.push(vec![
                "dividend_without_holding".into(),
                format!("{} {}", div.symbol, div.pay_date),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
