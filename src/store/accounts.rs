use std::collections::HashMap;
use std::sync::RwLock;

use crate::account;
use crate::account::Account;
use crate::account::AccountOpError;
use crate::transaction::AccountId;
use crate::transaction::PositiveAmount;

/// Signed balance effect, restricted to the two shapes the engine may ever
/// issue. Deltas of unknown net effect cannot be expressed, so they cannot
/// reach the store.
#[derive(Debug, Clone, Copy, parse_display::Display)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum BalanceDelta {
    #[display("+{0}")]
    Credit(PositiveAmount),
    #[display("-{0}")]
    Debit(PositiveAmount),
}

impl BalanceDelta {
    /// The delta that undoes `self`.
    pub const fn inverse(self) -> Self {
        match self {
            Self::Credit(amount) => Self::Debit(amount),
            Self::Debit(amount) => Self::Credit(amount),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AccountStoreError {
    #[error("account not found id={id}")]
    NotFound { id: AccountId },
    #[error("account already exists id={id}")]
    Duplicate { id: AccountId },
    #[error("inactive account, cannot adjust balance of {account}")]
    Inactive { account: Account },
    #[error(transparent)]
    Op(#[from] AccountOpError),
    #[error("accounts lock poisoned")]
    LockPoisoned,
}

/// Key-value storage of accounts with an atomic balance-adjustment
/// primitive.
///
/// A `HashMap` behind a `RwLock`: reads share the lock, every mutation takes
/// it exclusively, so `adjust_balance`'s read-check-write runs as one unit
/// with respect to other store calls.
#[derive(Debug, Default)]
pub struct AccountStore(RwLock<HashMap<AccountId, Account>>);

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`AccountStoreError::Duplicate`] when an account with the
    /// same id is already stored.
    pub fn insert(&self, account: Account) -> Result<(), AccountStoreError> {
        let mut accounts = self.0.write().map_err(|_| AccountStoreError::LockPoisoned)?;
        if accounts.contains_key(&account.id()) {
            return Err(AccountStoreError::Duplicate { id: account.id() });
        }
        accounts.insert(account.id(), account);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AccountStoreError::NotFound`] for unknown ids.
    pub fn get(&self, id: AccountId) -> Result<Account, AccountStoreError> {
        let accounts = self.0.read().map_err(|_| AccountStoreError::LockPoisoned)?;
        accounts
            .get(&id)
            .copied()
            .ok_or(AccountStoreError::NotFound { id })
    }

    /// All stored accounts in ascending id order.
    pub fn list(&self) -> Result<Vec<Account>, AccountStoreError> {
        let accounts = self.0.read().map_err(|_| AccountStoreError::LockPoisoned)?;
        let mut all: Vec<Account> = accounts.values().copied().collect();
        all.sort_unstable_by_key(Account::id);
        Ok(all)
    }

    /// Collaborator hook for the excluded registration layer.
    pub fn set_active(&self, id: AccountId, active: bool) -> Result<Account, AccountStoreError> {
        let mut accounts = self.0.write().map_err(|_| AccountStoreError::LockPoisoned)?;
        let account = accounts
            .get_mut(&id)
            .ok_or(AccountStoreError::NotFound { id })?;
        account::set_active(account, active);
        Ok(*account)
    }

    /// Applies `delta` to the account's balance as part of the caller's
    /// atomic unit and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account is unknown ([`AccountStoreError::NotFound`]).
    /// - The account is inactive ([`AccountStoreError::Inactive`]).
    /// - The balance arithmetic fails ([`AccountStoreError::Op`]); debits the
    ///   engine did not clear against the balance first end up here.
    pub fn adjust_balance(&self, id: AccountId, delta: BalanceDelta) -> Result<Account, AccountStoreError> {
        let mut accounts = self.0.write().map_err(|_| AccountStoreError::LockPoisoned)?;
        let account = accounts
            .get_mut(&id)
            .ok_or(AccountStoreError::NotFound { id })?;
        if !account.is_active() {
            return Err(AccountStoreError::Inactive { account: *account });
        }
        match delta {
            BalanceDelta::Credit(amount) => account::credit(account, amount)?,
            BalanceDelta::Debit(amount) => account::debit(account, amount)?,
        }
        Ok(*account)
    }
}
