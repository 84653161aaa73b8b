// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::snapshot::Snapshot;
use crate::models::{Account, Currency, Dividend, Transaction, TxType};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Folio", "folio"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("folio.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        currency TEXT NOT NULL,
        cash_balance TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- Append-only ledger. seq fixes insertion order so same-day entries
    -- replay the way they were entered.
    CREATE TABLE IF NOT EXISTS transactions(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        account_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('BUY','SELL','DEPOSIT','WITHDRAW')),
        symbol TEXT,
        name TEXT,
        price TEXT,
        quantity TEXT,
        fee TEXT NOT NULL DEFAULT '0',
        date TEXT NOT NULL,
        total_amount TEXT NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS dividends(
        id TEXT PRIMARY KEY,
        symbol TEXT NOT NULL,
        amount TEXT NOT NULL,
        pay_date TEXT NOT NULL,
        is_received INTEGER NOT NULL DEFAULT 0,
        account_id TEXT NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_dividends_pay_date ON dividends(pay_date);

    CREATE TABLE IF NOT EXISTS prices(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        symbol TEXT NOT NULL,
        as_of TEXT NOT NULL,
        price TEXT NOT NULL,
        source TEXT NOT NULL,
        UNIQUE(symbol, as_of)
    );
    "#,
    )?;
    Ok(())
}

pub fn account_by_name(conn: &Connection, name: &str) -> Result<Account> {
    let mut stmt =
        conn.prepare("SELECT id, name, currency, cash_balance FROM accounts WHERE name=?1")?;
    let row = stmt
        .query_row(params![name], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
            ))
        })
        .with_context(|| format!("Account '{}' not found", name))?;
    account_from_row(row)
}

pub fn load_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt =
        conn.prepare("SELECT id, name, currency, cash_balance FROM accounts ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(account_from_row(row?)?);
    }
    Ok(accounts)
}

fn account_from_row(row: (String, String, String, String)) -> Result<Account> {
    let (id, name, ccy, cash) = row;
    let cash_balance = Decimal::from_str_exact(&cash)
        .with_context(|| format!("Invalid stored cash balance '{}' for account {}", cash, name))?;
    Ok(Account {
        id,
        name,
        currency: ccy.parse::<Currency>()?,
        cash_balance,
    })
}

/// Full ledger, oldest-first with insertion order as the tiebreak. This is
/// the replay order the position aggregator assumes.
pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, type, symbol, name, price, quantity, fee, date, total_amount
         FROM transactions ORDER BY date ASC, seq ASC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(8)?,
            r.get::<_, String>(9)?,
        ))
    })?;
    let mut txs = Vec::new();
    for row in rows {
        let (id, account_id, typ, symbol, name, price, quantity, fee, date, total) = row?;
        let price = price
            .map(|p| {
                Decimal::from_str_exact(&p)
                    .with_context(|| format!("Invalid stored price '{}' for tx {}", p, id))
            })
            .transpose()?;
        let quantity = quantity
            .map(|q| {
                Decimal::from_str_exact(&q)
                    .with_context(|| format!("Invalid stored quantity '{}' for tx {}", q, id))
            })
            .transpose()?;
        let fee = Decimal::from_str_exact(&fee)
            .with_context(|| format!("Invalid stored fee '{}' for tx {}", fee, id))?;
        let total_amount = Decimal::from_str_exact(&total)
            .with_context(|| format!("Invalid stored total '{}' for tx {}", total, id))?;
        txs.push(Transaction {
            r#type: typ.parse::<TxType>()?,
            date: crate::utils::parse_date(&date)?,
            id,
            account_id,
            symbol,
            name,
            price,
            quantity,
            fee,
            total_amount,
        });
    }
    Ok(txs)
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            tx.id,
            tx.account_id,
            tx.r#type.as_str(),
            tx.symbol,
            tx.name,
            tx.price.map(|p| p.to_string()),
            tx.quantity.map(|q| q.to_string()),
            tx.fee.to_string(),
            tx.date.to_string(),
            tx.total_amount.to_string(),
        ],
    )?;
    Ok(())
}

pub fn update_cash_balance(conn: &Connection, account_id: &str, balance: Decimal) -> Result<()> {
    let n = conn.execute(
        "UPDATE accounts SET cash_balance=?1 WHERE id=?2",
        params![balance.to_string(), account_id],
    )?;
    anyhow::ensure!(n == 1, "Account '{}' not found", account_id);
    Ok(())
}

pub fn load_dividends(conn: &Connection) -> Result<Vec<Dividend>> {
    let mut stmt = conn.prepare(
        "SELECT id, symbol, amount, pay_date, is_received, account_id
         FROM dividends ORDER BY pay_date ASC, id ASC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, bool>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut dividends = Vec::new();
    for row in rows {
        let (id, symbol, amount, pay_date, is_received, account_id) = row?;
        let amount = Decimal::from_str_exact(&amount)
            .with_context(|| format!("Invalid stored amount '{}' for dividend {}", amount, id))?;
        dividends.push(Dividend {
            pay_date: crate::utils::parse_date(&pay_date)?,
            id,
            symbol,
            amount,
            is_received,
            account_id,
        });
    }
    Ok(dividends)
}

pub fn insert_dividend(conn: &Connection, div: &Dividend) -> Result<()> {
    conn.execute(
        "INSERT INTO dividends(id, symbol, amount, pay_date, is_received, account_id)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            div.id,
            div.symbol,
            div.amount.to_string(),
            div.pay_date.to_string(),
            div.is_received,
            div.account_id,
        ],
    )?;
    Ok(())
}

pub fn set_dividend_received(conn: &Connection, id: &str, is_received: bool) -> Result<()> {
    conn.execute(
        "UPDATE dividends SET is_received=?1 WHERE id=?2",
        params![is_received, id],
    )?;
    Ok(())
}

/// Latest stored price per symbol. These are the external marks that
/// override the last-buy price in every valuation path.
pub fn latest_marks(conn: &Connection) -> Result<HashMap<String, Decimal>> {
    let mut stmt = conn.prepare_cached(
        "SELECT symbol, price FROM (
             SELECT symbol,
                    price,
                    ROW_NUMBER() OVER (
                        PARTITION BY symbol
                        ORDER BY as_of DESC, id DESC
                    ) AS rn
             FROM prices
         ) WHERE rn = 1",
    )?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut marks = HashMap::new();
    for row in rows {
        let (symbol, price_s) = row?;
        let price = Decimal::from_str_exact(&price_s)
            .with_context(|| format!("Invalid stored price '{}' for {}", price_s, symbol))?;
        marks.insert(symbol, price);
    }
    Ok(marks)
}

pub fn insert_price(conn: &Connection, symbol: &str, as_of: &str, price: Decimal, source: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO prices(symbol, as_of, price, source) VALUES (?1,?2,?3,?4)
         ON CONFLICT(symbol, as_of) DO UPDATE SET price=excluded.price, source=excluded.source",
        params![symbol, as_of, price.to_string(), source],
    )?;
    Ok(())
}

pub fn load_snapshot(conn: &Connection) -> Result<Snapshot> {
    Ok(Snapshot {
        accounts: load_accounts(conn)?,
        transactions: load_transactions(conn)?,
        dividends: load_dividends(conn)?,
    })
}

/// Replace the whole portfolio with the given snapshot, atomically.
pub fn replace_with_snapshot(conn: &mut Connection, snap: &Snapshot) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM dividends", [])?;
    tx.execute("DELETE FROM transactions", [])?;
    tx.execute("DELETE FROM accounts", [])?;
    for acc in &snap.accounts {
        tx.execute(
            "INSERT INTO accounts(id, name, currency, cash_balance) VALUES (?1,?2,?3,?4)",
            params![
                acc.id,
                acc.name,
                acc.currency.as_str(),
                acc.cash_balance.to_string()
            ],
        )?;
    }
    for t in &snap.transactions {
        insert_transaction(&tx, t)?;
    }
    for d in &snap.dividends {
        insert_dividend(&tx, d)?;
    }
    tx.commit()?;
    Ok(())
}

/// Explicit whole-portfolio reset: the only way accounts are destroyed.
pub fn wipe(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM dividends", [])?;
    tx.execute("DELETE FROM transactions", [])?;
    tx.execute("DELETE FROM prices", [])?;
    tx.execute("DELETE FROM accounts", [])?;
    tx.commit()?;
    Ok(())
}
