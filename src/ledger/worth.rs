// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::positions::{compute_holdings, mark_prices};
use crate::models::{Account, Transaction, TxType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_worth: Decimal,
    pub total_cash: Decimal,
    pub total_invested: Decimal,
    /// Net external funding: deposits minus withdrawals, across all accounts.
    pub net_deposits: Decimal,
    pub profit: Decimal,
    pub profit_pct: Decimal,
}

/// Market value of one symbol merged across every account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub symbol: String,
    pub market_value: Decimal,
}

/// Sum of cash plus marked holdings across all accounts. `marks` carries
/// external price overrides; symbols without one value at their last-buy
/// mark.
pub fn total_worth(
    accounts: &[Account],
    transactions: &[Transaction],
    marks: &HashMap<String, Decimal>,
) -> Decimal {
    accounts
        .iter()
        .map(|acc| {
            let mut holdings = compute_holdings(&acc.id, transactions);
            mark_prices(&mut holdings, marks);
            let invested: Decimal = holdings.iter().map(|h| h.market_value()).sum();
            acc.cash_balance + invested
        })
        .sum()
}

pub fn summarize(
    accounts: &[Account],
    transactions: &[Transaction],
    marks: &HashMap<String, Decimal>,
) -> PortfolioSummary {
    let total_worth = total_worth(accounts, transactions, marks);
    let total_cash: Decimal = accounts.iter().map(|a| a.cash_balance).sum();
    let total_invested = total_worth - total_cash;

    let deposits: Decimal = transactions
        .iter()
        .filter(|t| t.r#type == TxType::Deposit)
        .map(|t| t.total_amount)
        .sum();
    let withdrawals: Decimal = transactions
        .iter()
        .filter(|t| t.r#type == TxType::Withdraw)
        .map(|t| t.total_amount)
        .sum();
    let net_deposits = deposits - withdrawals;

    let profit = total_worth - net_deposits;
    let profit_pct = if net_deposits.is_zero() {
        Decimal::ZERO
    } else {
        profit / net_deposits * Decimal::ONE_HUNDRED
    };

    PortfolioSummary {
        total_worth,
        total_cash,
        total_invested,
        net_deposits,
        profit,
        profit_pct,
    }
}

/// Holdings merged by symbol across all accounts, market value descending.
/// Truncation to a top-N plus a residual Cash bucket is left to the
/// presentation layer.
pub fn allocation(
    accounts: &[Account],
    transactions: &[Transaction],
    marks: &HashMap<String, Decimal>,
) -> Vec<AllocationSlice> {
    let mut by_symbol: BTreeMap<String, Decimal> = BTreeMap::new();
    for acc in accounts {
        let mut holdings = compute_holdings(&acc.id, transactions);
        mark_prices(&mut holdings, marks);
        for h in holdings {
            let market_value = h.market_value();
            *by_symbol.entry(h.symbol).or_insert(Decimal::ZERO) += market_value;
        }
    }

    let mut slices: Vec<AllocationSlice> = by_symbol
        .into_iter()
        .map(|(symbol, market_value)| AllocationSlice {
            symbol,
            market_value,
        })
        .collect();
    // Descending by value; symbol order from the BTreeMap breaks ties.
    slices.sort_by(|a, b| b.market_value.cmp(&a.market_value));
    slices
}
