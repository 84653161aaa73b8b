// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Dividend;
use crate::utils::new_id;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

/// Project the next four quarterly payments for a holding from a per-share
/// annual estimate. Pay dates land 3, 6, 9, and 12 months after `as_of`;
/// each amount is a quarter of the annual estimate times the held
/// quantity. A non-positive estimate yields no schedule at all.
pub fn generate_schedule(
    symbol: &str,
    account_id: &str,
    per_share_annual: Decimal,
    quantity: Decimal,
    as_of: NaiveDate,
) -> Vec<Dividend> {
    if per_share_annual <= Decimal::ZERO {
        return Vec::new();
    }

    let quarterly = per_share_annual / Decimal::from(4) * quantity;
    (1..=4)
        .map(|i| Dividend {
            id: new_id(),
            symbol: symbol.to_string(),
            amount: quarterly,
            pay_date: as_of + Months::new(3 * i),
            is_received: false,
            account_id: account_id.to_string(),
        })
        .collect()
}

/// Flip the received flag on the matching entry. Unknown ids are a no-op,
/// not an error; callers pass ids straight out of the current schedule.
pub fn toggle_received(dividends: &[Dividend], id: &str) -> Vec<Dividend> {
    dividends
        .iter()
        .map(|d| {
            let mut d = d.clone();
            if d.id == id {
                d.is_received = !d.is_received;
            }
            d
        })
        .collect()
}

pub fn total_received(dividends: &[Dividend]) -> Decimal {
    dividends
        .iter()
        .filter(|d| d.is_received)
        .map(|d| d.amount)
        .sum()
}

pub fn total_projected(dividends: &[Dividend]) -> Decimal {
    dividends
        .iter()
        .filter(|d| !d.is_received)
        .map(|d| d.amount)
        .sum()
}
