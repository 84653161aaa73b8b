// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Holding, Transaction, TxType};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Replay an account's transaction subsequence into its current holdings.
///
/// Entries are folded oldest-first: the input is stable-sorted by date, so
/// same-day entries keep their insertion order. Cash entries carry no
/// symbol and are skipped. A position whose quantity reaches zero (or
/// below) drops out of the result entirely; flat and short positions are
/// not represented.
///
/// The mark price is the latest BUY price for the symbol. Callers with an
/// external price feed override it afterwards via [`mark_prices`].
pub fn compute_holdings(account_id: &str, transactions: &[Transaction]) -> Vec<Holding> {
    let mut replay: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.account_id == account_id)
        .collect();
    replay.sort_by_key(|t| t.date);

    let mut holdings: BTreeMap<String, Holding> = BTreeMap::new();

    for tx in replay {
        let Some(symbol) = tx.symbol.as_deref() else {
            continue;
        };
        let (Some(price), Some(quantity)) = (tx.price, tx.quantity) else {
            continue;
        };

        let entry = holdings.entry(symbol.to_string()).or_insert_with(|| Holding {
            symbol: symbol.to_string(),
            name: tx.name.clone().unwrap_or_else(|| symbol.to_string()),
            quantity: Decimal::ZERO,
            average_price: Decimal::ZERO,
            current_price: price,
            sector: None,
        });

        match tx.r#type {
            TxType::Buy => {
                // Weighted-average cost basis, fee-exclusive.
                let total_cost = entry.quantity * entry.average_price + quantity * price;
                entry.quantity += quantity;
                entry.average_price = total_cost / entry.quantity;
                entry.current_price = price;
            }
            TxType::Sell => {
                // Average cost is untouched; realized P/L is not tracked.
                entry.quantity -= quantity;
            }
            TxType::Deposit | TxType::Withdraw => {}
        }

        if entry.quantity <= Decimal::ZERO {
            holdings.remove(symbol);
        }
    }

    holdings.into_values().collect()
}

/// Apply external price-feed marks. Symbols without an override keep their
/// last-buy mark.
pub fn mark_prices(holdings: &mut [Holding], marks: &HashMap<String, Decimal>) {
    for h in holdings.iter_mut() {
        if let Some(px) = marks.get(&h.symbol) {
            h.current_price = *px;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn trade(
        id: &str,
        account: &str,
        r#type: TxType,
        symbol: &str,
        qty: &str,
        price: &str,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: id.into(),
            account_id: account.into(),
            r#type,
            symbol: Some(symbol.into()),
            name: None,
            price: Some(dec(price)),
            quantity: Some(dec(qty)),
            fee: Decimal::ZERO,
            date: d(date),
            total_amount: dec(price) * dec(qty),
        }
    }

    fn cash(id: &str, account: &str, r#type: TxType, amount: &str, date: &str) -> Transaction {
        Transaction {
            id: id.into(),
            account_id: account.into(),
            r#type,
            symbol: None,
            name: None,
            price: None,
            quantity: None,
            fee: Decimal::ZERO,
            date: d(date),
            total_amount: dec(amount),
        }
    }

    #[test]
    fn weighted_average_cost_basis() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "ABC", "10", "10", "2024-01-01"),
            trade("2", "a1", TxType::Buy, "ABC", "10", "20", "2024-02-01"),
        ];
        let holdings = compute_holdings("a1", &txs);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, dec("20"));
        assert_eq!(holdings[0].average_price, dec("15"));
        assert_eq!(holdings[0].current_price, dec("20"));
    }

    #[test]
    fn sell_leaves_average_unchanged() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "ABC", "10", "10", "2024-01-01"),
            trade("2", "a1", TxType::Buy, "ABC", "10", "20", "2024-02-01"),
            trade("3", "a1", TxType::Sell, "ABC", "5", "25", "2024-03-01"),
        ];
        let holdings = compute_holdings("a1", &txs);
        assert_eq!(holdings[0].quantity, dec("15"));
        assert_eq!(holdings[0].average_price, dec("15"));
        // Mark stays at the last BUY, not the sell price.
        assert_eq!(holdings[0].current_price, dec("20"));
    }

    #[test]
    fn flat_position_is_removed() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "XYZ", "10", "100", "2024-01-01"),
            trade("2", "a1", TxType::Sell, "XYZ", "10", "110", "2024-02-01"),
        ];
        assert!(compute_holdings("a1", &txs).is_empty());
    }

    #[test]
    fn oversell_is_removed_not_negative() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "XYZ", "10", "100", "2024-01-01"),
            trade("2", "a1", TxType::Sell, "XYZ", "15", "110", "2024-02-01"),
        ];
        assert!(compute_holdings("a1", &txs).is_empty());
    }

    #[test]
    fn cash_entries_are_skipped() {
        let txs = vec![
            cash("1", "a1", TxType::Deposit, "1000", "2024-01-01"),
            trade("2", "a1", TxType::Buy, "ABC", "5", "10", "2024-01-02"),
            cash("3", "a1", TxType::Withdraw, "200", "2024-01-03"),
        ];
        let holdings = compute_holdings("a1", &txs);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, dec("5"));
    }

    #[test]
    fn other_accounts_are_filtered_out() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "ABC", "5", "10", "2024-01-01"),
            trade("2", "a2", TxType::Buy, "ABC", "7", "10", "2024-01-01"),
        ];
        let holdings = compute_holdings("a1", &txs);
        assert_eq!(holdings[0].quantity, dec("5"));
    }

    #[test]
    fn replay_sorts_by_date_before_folding() {
        // Newest-first input (display order) must produce the same result
        // as oldest-first.
        let newest_first = vec![
            trade("3", "a1", TxType::Sell, "ABC", "5", "25", "2024-03-01"),
            trade("2", "a1", TxType::Buy, "ABC", "10", "20", "2024-02-01"),
            trade("1", "a1", TxType::Buy, "ABC", "10", "10", "2024-01-01"),
        ];
        let mut oldest_first = newest_first.clone();
        oldest_first.reverse();
        assert_eq!(
            compute_holdings("a1", &newest_first),
            compute_holdings("a1", &oldest_first)
        );
    }

    #[test]
    fn replay_is_deterministic() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "ABC", "3", "7.5", "2024-01-01"),
            trade("2", "a1", TxType::Buy, "DEF", "2", "11", "2024-01-01"),
            trade("3", "a1", TxType::Sell, "ABC", "1", "8", "2024-01-02"),
        ];
        assert_eq!(compute_holdings("a1", &txs), compute_holdings("a1", &txs));
    }

    #[test]
    fn quantity_is_signed_sum_of_buys_minus_sells() {
        let txs = vec![
            trade("1", "a1", TxType::Buy, "ABC", "10", "10", "2024-01-01"),
            trade("2", "a1", TxType::Sell, "ABC", "3", "11", "2024-01-02"),
            trade("3", "a1", TxType::Buy, "ABC", "4", "12", "2024-01-03"),
            trade("4", "a1", TxType::Sell, "ABC", "2", "13", "2024-01-04"),
        ];
        let holdings = compute_holdings("a1", &txs);
        assert_eq!(holdings[0].quantity, dec("9"));
    }

    #[test]
    fn mark_prices_overrides_last_buy() {
        let txs = vec![trade("1", "a1", TxType::Buy, "ABC", "10", "10", "2024-01-01")];
        let mut holdings = compute_holdings("a1", &txs);
        let marks = HashMap::from([("ABC".to_string(), dec("12.34"))]);
        mark_prices(&mut holdings, &marks);
        assert_eq!(holdings[0].current_price, dec("12.34"));
        assert_eq!(holdings[0].market_value(), dec("123.40"));
    }
}
