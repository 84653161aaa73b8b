// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::{Account, Currency, Transaction, TxType};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_decimal, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let currency: Currency = sub.get_one::<String>("currency").unwrap().trim().parse()?;
    let cash = match sub.get_one::<String>("cash") {
        Some(raw) => parse_decimal(raw.trim())?.abs(),
        None => Decimal::ZERO,
    };

    let account = Account {
        id: new_id(),
        name,
        currency,
        cash_balance: cash,
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO accounts(id, name, currency, cash_balance) VALUES (?1,?2,?3,?4)",
        params![
            account.id,
            account.name,
            account.currency.as_str(),
            account.cash_balance.to_string()
        ],
    )?;
    // A seed balance enters the ledger as a deposit so that replaying the
    // ledger always reproduces the stored cash.
    if cash > Decimal::ZERO {
        let seed = Transaction {
            id: new_id(),
            account_id: account.id.clone(),
            r#type: TxType::Deposit,
            symbol: None,
            name: None,
            price: None,
            quantity: None,
            fee: Decimal::ZERO,
            date: Utc::now().date_naive(),
            total_amount: cash,
        };
        db::insert_transaction(&tx, &seed)?;
    }
    tx.commit()?;

    println!(
        "Added account '{}' ({}, cash {})",
        account.name,
        account.currency,
        fmt_money(account.cash_balance, account.currency.as_str())
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let accounts = db::load_accounts(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
        return Ok(());
    }
    let rows = accounts
        .into_iter()
        .map(|a| {
            vec![
                a.name,
                a.currency.as_str().to_string(),
                format!("{:.2}", a.cash_balance),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Name", "Currency", "Cash"], rows));
    Ok(())
}

/// Whole-portfolio reset. The only path that destroys accounts.
pub fn reset(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    if !m.get_flag("yes") {
        anyhow::bail!("Refusing to wipe without --yes");
    }
    db::wipe(conn)?;
    println!("Portfolio wiped");
    Ok(())
}
