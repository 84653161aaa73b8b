// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    HKD,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::HKD => "HKD",
        }
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "HKD" => Ok(Currency::HKD),
            other => Err(LedgerError::InvalidTransaction(format!(
                "unsupported currency '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxType {
    Buy,
    Sell,
    Deposit,
    Withdraw,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Buy => "BUY",
            TxType::Sell => "SELL",
            TxType::Deposit => "DEPOSIT",
            TxType::Withdraw => "WITHDRAW",
        }
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, TxType::Buy | TxType::Sell)
    }
}

impl FromStr for TxType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(TxType::Buy),
            "SELL" => Ok(TxType::Sell),
            "DEPOSIT" => Ok(TxType::Deposit),
            "WITHDRAW" => Ok(TxType::Withdraw),
            other => Err(LedgerError::InvalidTransaction(format!(
                "unknown transaction type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub currency: Currency,
    pub cash_balance: Decimal,
}

/// One immutable entry in the append-only ledger. Corrections are modeled
/// as new offsetting entries, never edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub r#type: TxType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    pub fee: Decimal,
    pub date: NaiveDate,
    /// Authoritative cash-flow magnitude, fixed at entry time
    /// (BUY: price*qty + fee, SELL: price*qty - fee). Never recomputed here.
    pub total_amount: Decimal,
}

impl Transaction {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.fee < Decimal::ZERO {
            return Err(LedgerError::InvalidTransaction(format!(
                "fee must be >= 0, got {}",
                self.fee
            )));
        }
        match self.r#type {
            TxType::Buy | TxType::Sell => {
                match self.symbol.as_deref() {
                    Some(s) if !s.trim().is_empty() => {}
                    _ => {
                        return Err(LedgerError::InvalidTransaction(format!(
                            "{} requires a symbol",
                            self.r#type
                        )));
                    }
                }
                match self.quantity {
                    Some(q) if q > Decimal::ZERO => {}
                    _ => {
                        return Err(LedgerError::InvalidTransaction(format!(
                            "{} requires a quantity > 0",
                            self.r#type
                        )));
                    }
                }
                match self.price {
                    Some(p) if p >= Decimal::ZERO => {}
                    _ => {
                        return Err(LedgerError::InvalidTransaction(format!(
                            "{} requires a price >= 0",
                            self.r#type
                        )));
                    }
                }
            }
            TxType::Deposit | TxType::Withdraw => {
                if self.total_amount < Decimal::ZERO {
                    return Err(LedgerError::InvalidTransaction(format!(
                        "{} requires a total amount >= 0, got {}",
                        self.r#type, self.total_amount
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: String,
    pub symbol: String,
    pub amount: Decimal,
    pub pay_date: NaiveDate,
    pub is_received: bool,
    pub account_id: String,
}

/// Derived position. Never stored; always recomputed from the account's
/// transaction subsequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub current_price: Decimal,
    /// Filled by an external metadata lookup; replay alone never sets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl Holding {
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }
}
