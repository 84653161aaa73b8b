// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("snapshot", sub)) => export_snapshot(conn, sub),
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Full-state backup: accounts, ledger, dividends. Round-trips losslessly
/// through `import snapshot`.
fn export_snapshot(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap();
    let snap = db::load_snapshot(conn)?;
    std::fs::write(out, snap.to_json()?)?;
    println!(
        "Exported {} accounts, {} transactions, {} dividends to {}",
        snap.accounts.len(),
        snap.transactions.len(),
        snap.dividends.len(),
        out
    );
    Ok(())
}

/// One ledger row flattened for the export formats. Account comes back as
/// its display name, not the internal id.
#[derive(Serialize)]
struct ExportRow {
    date: String,
    account: String,
    r#type: String,
    symbol: String,
    quantity: String,
    price: String,
    fee: String,
    total_amount: String,
}

const EXPORT_HEADER: [&str; 8] = [
    "date", "account", "type", "symbol", "quantity", "price", "fee", "total_amount",
];

fn export_rows(conn: &Connection) -> Result<Vec<ExportRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.date, a.name, t.type, t.symbol, t.quantity, t.price, t.fee, t.total_amount
         FROM transactions t
         LEFT JOIN accounts a ON t.account_id=a.id
         ORDER BY t.date ASC, t.seq ASC",
    )?;
    let mut cur = stmt.query([])?;
    let mut rows = Vec::new();
    while let Some(r) = cur.next()? {
        rows.push(ExportRow {
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
    Ok(rows)
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    // Unknown formats fail before the output file is created.
    let rows = export_rows(conn)?;
    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(out)?;
            wtr.write_record(EXPORT_HEADER)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported {} ledger rows to {}", rows.len(), out);
    Ok(())
}
