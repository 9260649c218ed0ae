//! Free functions that mutate a supplied [`Account`].
//!
//! These functions intentionally accept `&mut Account` so that the caller
//! must make mutability explicit at the call site; the account store is the
//! only production caller and invokes them inside its write lock.

use rust_decimal::Decimal;

use crate::account::Account;
use crate::transaction::PositiveAmount;

#[derive(thiserror::Error, Debug)]
pub enum AccountOpError {
    #[error("overflow while applying {amount} to {account}")]
    OperationOverflow { account: Account, amount: PositiveAmount },
    #[error("insufficient funds, need {amount} in {account}")]
    InsufficientFunds { account: Account, amount: PositiveAmount },
}

/// Adds `amount` to the account's balance.
///
/// # Errors
///
/// Returns an error if:
/// - Adding `amount` to the balance overflows ([`AccountOpError::OperationOverflow`]).
pub fn credit(account: &mut Account, amount: PositiveAmount) -> Result<(), AccountOpError> {
    account.balance = checked_add(account, amount)?;
    Ok(())
}

/// Subtracts `amount` from the account's balance.
///
/// # Errors
///
/// Returns an error if:
/// - The balance is less than `amount` ([`AccountOpError::InsufficientFunds`]).
/// - Subtracting `amount` from the balance overflows ([`AccountOpError::OperationOverflow`]).
pub fn debit(account: &mut Account, amount: PositiveAmount) -> Result<(), AccountOpError> {
    account.balance = checked_sub(account, amount)?;
    Ok(())
}

/// Flips the account's `active` flag.
///
/// Inactive accounts are refused for new submissions and balance
/// adjustments. Idempotent: setting the current value has no effect.
pub const fn set_active(account: &mut Account, active: bool) {
    account.active = active;
}

fn checked_add(account: &Account, amount: PositiveAmount) -> Result<Decimal, AccountOpError> {
    account
        .balance
        .checked_add(amount.as_inner())
        .ok_or_else(|| overflow_error(account, amount))
}

fn checked_sub(account: &Account, amount: PositiveAmount) -> Result<Decimal, AccountOpError> {
    if account.balance < amount.as_inner() {
        return Err(insufficient_funds_error(account, amount));
    }
    account
        .balance
        .checked_sub(amount.as_inner())
        .ok_or_else(|| overflow_error(account, amount))
}

const fn overflow_error(account: &Account, amount: PositiveAmount) -> AccountOpError {
    AccountOpError::OperationOverflow {
        account: *account,
        amount,
    }
}

const fn insufficient_funds_error(account: &Account, amount: PositiveAmount) -> AccountOpError {
    AccountOpError::InsufficientFunds {
        account: *account,
        amount,
    }
}
