use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::transaction::AccountId;
use crate::transaction::PositiveAmount;
use crate::transaction::Transaction;
use crate::transaction::TransactionId;
use crate::transaction::TransactionKind;
use crate::transaction::TransactionStatus;

#[derive(thiserror::Error, Debug)]
pub enum TransactionLogError {
    #[error("destination address must not be empty")]
    EmptyDestination,
    #[error("transaction not found id={id}")]
    NotFound { id: TransactionId },
    #[error("transaction already resolved {tx}")]
    AlreadyResolved { tx: Transaction },
    #[error("transaction log lock poisoned")]
    LockPoisoned,
}

/// Append-only record of every deposit/withdrawal request and its outcome.
///
/// Ids are assigned monotonically inside the write lock, so iterating the
/// `BTreeMap` in key order is creation order; that makes the oldest-first
/// pending queue and per-account histories plain ordered scans instead of a
/// sort at every listing.
#[derive(Debug, Default)]
pub struct TransactionLog {
    inner: RwLock<LogInner>,
}

#[derive(Debug, Default)]
struct LogInner {
    last_id: u64,
    entries: BTreeMap<TransactionId, Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new pending transaction and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionLogError::EmptyDestination`] when the
    /// destination address is blank. Amount positivity is already carried by
    /// [`PositiveAmount`].
    pub fn create(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        amount: PositiveAmount,
        destination_address: &str,
    ) -> Result<Transaction, TransactionLogError> {
        if destination_address.trim().is_empty() {
            return Err(TransactionLogError::EmptyDestination);
        }

        let mut inner = self.inner.write().map_err(|_| TransactionLogError::LockPoisoned)?;
        inner.last_id += 1;
        let tx = Transaction::new(
            TransactionId(inner.last_id),
            account_id,
            kind,
            amount,
            destination_address.to_owned(),
            Utc::now(),
        );
        inner.entries.insert(tx.id(), tx.clone());
        Ok(tx)
    }

    /// # Errors
    ///
    /// Returns [`TransactionLogError::NotFound`] for unknown ids.
    pub fn get(&self, id: TransactionId) -> Result<Transaction, TransactionLogError> {
        let inner = self.inner.read().map_err(|_| TransactionLogError::LockPoisoned)?;
        inner
            .entries
            .get(&id)
            .cloned()
            .ok_or(TransactionLogError::NotFound { id })
    }

    /// Pending transactions, oldest first, to give operators a fair queue.
    pub fn list_pending(&self) -> Result<Vec<Transaction>, TransactionLogError> {
        let inner = self.inner.read().map_err(|_| TransactionLogError::LockPoisoned)?;
        Ok(inner.entries.values().filter(|tx| tx.is_pending()).cloned().collect())
    }

    /// Every transaction owned by `account_id`, in creation order.
    pub fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, TransactionLogError> {
        let inner = self.inner.read().map_err(|_| TransactionLogError::LockPoisoned)?;
        Ok(inner
            .entries
            .values()
            .filter(|tx| tx.account_id() == account_id)
            .cloned()
            .collect())
    }

    /// Conditional lifecycle update: succeeds only while the transaction is
    /// still pending, so two racing resolutions cannot both win.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction is unknown ([`TransactionLogError::NotFound`]).
    /// - The transaction already left `Pending` ([`TransactionLogError::AlreadyResolved`]).
    pub fn resolve(&self, id: TransactionId, status: TransactionStatus) -> Result<Transaction, TransactionLogError> {
        debug_assert!(!matches!(status, TransactionStatus::Pending));

        let mut inner = self.inner.write().map_err(|_| TransactionLogError::LockPoisoned)?;
        let tx = inner
            .entries
            .get_mut(&id)
            .ok_or(TransactionLogError::NotFound { id })?;
        if !tx.is_pending() {
            return Err(TransactionLogError::AlreadyResolved { tx: tx.clone() });
        }
        tx.mark(status);
        Ok(tx.clone())
    }
}
