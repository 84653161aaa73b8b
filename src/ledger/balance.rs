// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::LedgerError;
use crate::models::{Account, Transaction, TxType};
use rust_decimal::Decimal;

/// Apply one ledger entry to an account's cash balance, returning the
/// updated account. The input is untouched. `total_amount` is trusted as
/// the cash-flow magnitude; fee arithmetic already happened at entry time.
///
/// Overdraft is permitted: this is a tracking ledger, not a settlement
/// system. Use [`apply_transaction_checked`] for strict semantics.
pub fn apply_transaction(account: &Account, tx: &Transaction) -> Result<Account, LedgerError> {
    if tx.account_id != account.id {
        return Err(LedgerError::UnknownAccount(tx.account_id.clone()));
    }
    tx.validate()?;

    let cash_balance = match tx.r#type {
        TxType::Deposit | TxType::Sell => account.cash_balance + tx.total_amount,
        TxType::Withdraw | TxType::Buy => account.cash_balance - tx.total_amount,
    };

    Ok(Account {
        cash_balance,
        ..account.clone()
    })
}

/// Strict variant: refuses a BUY or WITHDRAW that would push the balance
/// below zero.
pub fn apply_transaction_checked(
    account: &Account,
    tx: &Transaction,
) -> Result<Account, LedgerError> {
    let updated = apply_transaction(account, tx)?;
    if updated.cash_balance < Decimal::ZERO
        && matches!(tx.r#type, TxType::Buy | TxType::Withdraw)
    {
        return Err(LedgerError::InsufficientFunds {
            account: account.name.clone(),
            balance: account.cash_balance,
            required: tx.total_amount,
        });
    }
    Ok(updated)
}
