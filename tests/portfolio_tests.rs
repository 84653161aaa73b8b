// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use folio::commands::{holdings, portfolio};
use folio::db;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(id, name, currency, cash_balance) VALUES
         ('a1','Broker','USD','700'), ('a2','Retirement','USD','50')",
        [],
    )
    .unwrap();
    // Broker: deposited 1000, bought 10 ABC @ 30
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t1','a1','DEPOSIT',NULL,NULL,NULL,NULL,'0','2024-01-02','1000')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t2','a1','BUY','ABC','ABC Corp','30','10','0','2024-01-03','300')",
        [],
    )
    .unwrap();
    // Retirement: deposited 250, bought 5 ABC @ 40 and 1 DEF @ 500, withdrew 100
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t3','a2','DEPOSIT',NULL,NULL,NULL,NULL,'0','2024-01-02','250')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t4','a2','BUY','ABC','ABC Corp','40','5','0','2024-01-04','200')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t5','a2','BUY','DEF','Defensive Inc','500','1','0','2024-01-05','500')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t6','a2','WITHDRAW',NULL,NULL,NULL,NULL,'0','2024-01-06','100')",
        [],
    )
    .unwrap();
    conn
}

#[test]
fn summary_matches_per_account_arithmetic() {
    let conn = setup();
    let s = portfolio::compute_summary(&conn).unwrap();

    // Broker: 700 cash + 10*30; Retirement: 50 cash + 5*40 + 1*500.
    // ABC marks at 40 in a2 but 30 in a1: marks are per-account last-buy.
    assert_eq!(s.total_cash, dec("750"));
    assert_eq!(s.total_invested, dec("1000"));
    assert_eq!(s.total_worth, dec("1750"));

    assert_eq!(s.net_deposits, dec("1150"));
    assert_eq!(s.profit, dec("600"));
}

#[test]
fn stored_marks_override_last_buy_everywhere() {
    let conn = setup();
    db::insert_price(&conn, "ABC", "2024-02-01", dec("50"), "manual").unwrap();

    let s = portfolio::compute_summary(&conn).unwrap();
    // 15 ABC shares across accounts now mark at 50.
    assert_eq!(s.total_invested, dec("1250"));
    assert_eq!(s.total_worth, dec("2000"));

    let broker = holdings::account_holdings(&conn, "Broker").unwrap();
    assert_eq!(broker[0].current_price, dec("50"));
}

#[test]
fn allocation_breakdown_merges_and_appends_cash_bucket() {
    let conn = setup();
    let slices = portfolio::allocation_breakdown(&conn, 5).unwrap();

    // ABC merged across accounts: 10*30 + 5*40 = 500; DEF 500; then Cash.
    assert_eq!(slices.len(), 3);
    assert!(slices[..2].iter().any(|s| s.symbol == "ABC" && s.market_value == dec("500")));
    assert!(slices[..2].iter().any(|s| s.symbol == "DEF" && s.market_value == dec("500")));
    assert_eq!(slices[2].symbol, "Cash");
    assert_eq!(slices[2].market_value, dec("750"));
}

#[test]
fn allocation_truncates_to_top_n() {
    let conn = setup();
    let slices = portfolio::allocation_breakdown(&conn, 1).unwrap();
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[1].symbol, "Cash");
}

#[test]
fn holdings_view_reports_average_cost_and_mark() {
    let conn = setup();
    // Add a second ABC buy in Broker to exercise the weighted average.
    conn.execute(
        "INSERT INTO transactions(id, account_id, type, symbol, name, price, quantity, fee, date, total_amount)
         VALUES ('t7','a1','BUY','ABC','ABC Corp','60','10','0','2024-02-01','600')",
        [],
    )
    .unwrap();

    let broker = holdings::account_holdings(&conn, "Broker").unwrap();
    assert_eq!(broker.len(), 1);
    assert_eq!(broker[0].quantity, dec("20"));
    assert_eq!(broker[0].average_price, dec("45"));
    assert_eq!(broker[0].current_price, dec("60"));
    assert_eq!(broker[0].name, "ABC Corp");
}
