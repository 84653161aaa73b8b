// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::balance::{apply_transaction, apply_transaction_checked};
use crate::models::{Transaction, TxType};
use crate::utils::{maybe_print_json, new_id, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("deposit", sub)) => cash_entry(conn, sub, TxType::Deposit)?,
        Some(("withdraw", sub)) => cash_entry(conn, sub, TxType::Withdraw)?,
        Some(("buy", sub)) => trade_entry(conn, sub, TxType::Buy)?,
        Some(("sell", sub)) => trade_entry(conn, sub, TxType::Sell)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn cash_entry(conn: &mut Connection, sub: &clap::ArgMatches, r#type: TxType) -> Result<()> {
    let account_name = sub.get_one::<String>("account").unwrap().trim();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap().trim())?.abs();
    let date = parse_date(sub.get_one::<String>("date").unwrap().trim())?;
    let fee = match sub.get_one::<String>("fee") {
        Some(raw) => parse_decimal(raw.trim())?,
        None => Decimal::ZERO,
    };

    let tx = Transaction {
        id: new_id(),
        account_id: String::new(), // filled in by append
        r#type,
        symbol: None,
        name: None,
        price: None,
        quantity: None,
        fee,
        date,
        total_amount: amount,
    };
    let balance = append(conn, account_name, tx, sub.get_flag("strict"))?;
    println!(
        "Recorded {} {} on {} (acct: {}, cash now {})",
        r#type, amount, date, account_name, balance
    );
    Ok(())
}

fn trade_entry(conn: &mut Connection, sub: &clap::ArgMatches, r#type: TxType) -> Result<()> {
    let account_name = sub.get_one::<String>("account").unwrap().trim();
    let symbol = sub.get_one::<String>("symbol").unwrap().trim().to_uppercase();
    let quantity = parse_decimal(sub.get_one::<String>("quantity").unwrap().trim())?.abs();
    let price = parse_decimal(sub.get_one::<String>("price").unwrap().trim())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap().trim())?;
    let fee = match sub.get_one::<String>("fee") {
        Some(raw) => parse_decimal(raw.trim())?,
        None => Decimal::ZERO,
    };
    let name = sub.get_one::<String>("name").map(|s| s.trim().to_string());

    // The trade-entry surface owns fee arithmetic. Downstream, total_amount
    // is the cash-flow truth and is never recomputed.
    let total_amount = match r#type {
        TxType::Buy => price * quantity + fee,
        TxType::Sell => price * quantity - fee,
        _ => unreachable!(),
    };

    let tx = Transaction {
        id: new_id(),
        account_id: String::new(),
        r#type,
        symbol: Some(symbol.clone()),
        name,
        price: Some(price),
        quantity: Some(quantity),
        fee,
        date,
        total_amount,
    };
    let balance = append(conn, account_name, tx, sub.get_flag("strict"))?;
    println!(
        "Recorded {} {} x {} @ {} (fees {}, cash now {})",
        r#type, quantity, symbol, price, fee, balance
    );
    Ok(())
}

/// Validate, apply to the cash balance, and persist entry + new balance in
/// one sqlite transaction. Returns the updated balance.
pub fn append(
    conn: &mut Connection,
    account_name: &str,
    mut tx: Transaction,
    strict: bool,
) -> Result<Decimal> {
    let account = db::account_by_name(conn, account_name)?;
    tx.account_id = account.id.clone();

    let updated = if strict {
        apply_transaction_checked(&account, &tx)?
    } else {
        apply_transaction(&account, &tx)?
    };

    let sql_tx = conn.transaction()?;
    db::insert_transaction(&sql_tx, &tx)?;
    db::update_cash_balance(&sql_tx, &account.id, updated.cash_balance)?;
    sql_tx.commit()?;
    Ok(updated.cash_balance)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data.into_iter().map(LedgerRow::into_cells).collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Account", "Type", "Symbol", "Qty", "Price", "Fee", "Total"],
            rows,
        )
    );
    Ok(())
}

#[derive(Serialize)]
pub struct LedgerRow {
    pub date: String,
    pub account: String,
    pub r#type: String,
    pub symbol: String,
    pub quantity: String,
    pub price: String,
    pub fee: String,
    pub total_amount: String,
}

impl LedgerRow {
    fn into_cells(self) -> Vec<String> {
        vec![
            self.date,
            self.account,
            self.r#type,
            self.symbol,
            self.quantity,
            self.price,
            self.fee,
            self.total_amount,
        ]
    }
}

/// Newest-first ledger listing with optional account and YYYY-MM filters.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<LedgerRow>> {
    let mut filters = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        filters.push("substr(t.date,1,7)=?");
        binds.push(month.clone());
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        filters.push("a.name=?");
        binds.push(acct.clone());
    }

    let mut sql = String::from(
        "SELECT t.date, a.name, t.type, t.symbol, t.quantity, t.price, t.fee, t.total_amount
         FROM transactions t LEFT JOIN accounts a ON t.account_id=a.id",
    );
    for (i, clause) in filters.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(clause);
    }
    sql.push_str(" ORDER BY t.date DESC, t.seq DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        binds.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(binds.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(LedgerRow {
            date: r.get(0)?,
            account: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
            r#type: r.get(2)?,
            symbol: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
            quantity: r.get::<_, Option<String>>(4)?.unwrap_or_default(),
            price: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
            fee: r.get(6)?,
            total_amount: r.get(7)?,
        });
    }
    Ok(data)
}
