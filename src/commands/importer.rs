// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::snapshot::Snapshot;
use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("snapshot", sub)) => import_snapshot(conn, sub),
        _ => Ok(()),
    }
}

/// Replace the whole portfolio with a snapshot file. Inverse of
/// `export snapshot`.
fn import_snapshot(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("file").unwrap();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
    let snap = Snapshot::from_json(&raw)?;
    // Imported entries get the same scrutiny as the tx entry surface;
    // nothing replayable may land in the ledger malformed.
    for tx in &snap.transactions {
        if let Err(e) = tx.validate() {
            return Err(anyhow!("Snapshot rejected: transaction {}: {}", tx.id, e));
        }
    }
    db::replace_with_snapshot(conn, &snap)?;
    println!(
        "Imported {} accounts, {} transactions, {} dividends from {}",
        snap.accounts.len(),
        snap.transactions.len(),
        snap.dividends.len(),
        path
    );
    Ok(())
}
