// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the ledger core. All of them are local and
/// synchronous; the core performs no I/O and holds no mutable state.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Unknown account '{0}'")]
    UnknownAccount(String),

    #[error("Insufficient funds in account '{account}': balance {balance}, required {required}")]
    InsufficientFunds {
        account: String,
        balance: rust_decimal::Decimal,
        required: rust_decimal::Decimal,
    },
}
