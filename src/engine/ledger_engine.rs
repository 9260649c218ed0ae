use rust_decimal::Decimal;

use crate::account::Account;
use crate::account::Principal;
use crate::account::Role;
use crate::engine::account_locks::AccountLocks;
use crate::store::AccountStore;
use crate::store::AccountStoreError;
use crate::store::BalanceDelta;
use crate::store::SettingsStore;
use crate::store::SettingsStoreError;
use crate::store::SiteSettings;
use crate::store::TransactionLog;
use crate::store::TransactionLogError;
use crate::transaction::AccountId;
use crate::transaction::Decision;
use crate::transaction::PositiveAmount;
use crate::transaction::Transaction;
use crate::transaction::TransactionId;
use crate::transaction::TransactionKind;
use crate::transaction::TransactionStatus;

#[cfg(test)]
#[path = "tests/ledger_engine_tests.rs"]
mod ledger_engine_tests;

/// Orchestrates request submission and the atomic approve/reject protocol
/// over the account store, transaction log and settings store.
///
/// `decide` is the only writer of balances and the only caller of the log's
/// resolve; each decision runs under the owning account's mutex, so the
/// already-resolved check, the approval-time funds re-check and the balance
/// adjustment form one isolated unit.
#[derive(Debug, Default)]
pub struct LedgerEngine {
    accounts: AccountStore,
    transactions: TransactionLog,
    settings: SettingsStore,
    decision_locks: AccountLocks,
}

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("inactive account, cannot submit transactions for {account}")]
    InactiveSubmitter { account: Account },
    #[error("operator role required for {operation}, principal={principal:?}")]
    OperatorRequired {
        principal: Principal,
        operation: &'static str,
    },
    #[error("amount below configured {kind} minimum, amount={amount} minimum={minimum}")]
    BelowMinimum {
        kind: TransactionKind,
        amount: PositiveAmount,
        minimum: Decimal,
    },
    #[error("insufficient funds to approve {tx}, balance={balance}")]
    InsufficientFunds { tx: Transaction, balance: Decimal },
    #[error("decision lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Accounts(#[from] AccountStoreError),
    #[error(transparent)]
    Transactions(#[from] TransactionLogError),
    #[error(transparent)]
    Settings(#[from] SettingsStoreError),
}

impl LedgerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborator surface for the excluded registration layer: seeding
    /// accounts and toggling their `active` flag.
    pub const fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Records a new pending transaction for the principal's account.
    ///
    /// No balance is read or written here: a withdrawal may exceed the
    /// current balance and still be accepted, because the balance can change
    /// between submission and review. Sufficiency is enforced at approval
    /// time only.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal's account is unknown ([`AccountStoreError::NotFound`]).
    /// - The account is inactive ([`LedgerError::InactiveSubmitter`]).
    /// - The amount is below the configured minimum for its kind
    ///   ([`LedgerError::BelowMinimum`]).
    /// - The destination address is blank ([`TransactionLogError::EmptyDestination`]).
    pub fn submit(
        &self,
        principal: &Principal,
        kind: TransactionKind,
        amount: PositiveAmount,
        destination_address: &str,
    ) -> Result<Transaction, LedgerError> {
        let account = self.accounts.get(principal.id)?;
        if !account.is_active() {
            return Err(LedgerError::InactiveSubmitter { account });
        }

        let settings = self.settings.get()?;
        let minimum = match kind {
            TransactionKind::Deposit => settings.min_deposit,
            TransactionKind::Withdrawal => settings.min_withdraw,
        };
        if amount.as_inner() < minimum {
            return Err(LedgerError::BelowMinimum { kind, amount, minimum });
        }

        let tx = self.transactions.create(principal.id, kind, amount, destination_address)?;
        tracing::info!("submitted {tx}");
        Ok(tx)
    }

    /// Applies an operator decision to a pending transaction as one atomic
    /// unit: on approval the balance moves and the status flips together, or
    /// neither does.
    ///
    /// Not idempotent-retry-safe by id alone: a second call on a resolved
    /// transaction fails with [`TransactionLogError::AlreadyResolved`] and
    /// mutates nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The operator is not an admin ([`LedgerError::OperatorRequired`]).
    /// - The transaction is unknown ([`TransactionLogError::NotFound`]).
    /// - The transaction already left pending ([`TransactionLogError::AlreadyResolved`]).
    /// - Approving a withdrawal would drive the balance negative
    ///   ([`LedgerError::InsufficientFunds`]); the transaction stays pending
    ///   for the operator to reject or await funding.
    /// - The owning account cannot take the adjustment
    ///   ([`AccountStoreError::NotFound`] / [`AccountStoreError::Inactive`]).
    pub fn decide(
        &self,
        operator: &Principal,
        id: TransactionId,
        decision: Decision,
    ) -> Result<Transaction, LedgerError> {
        self.require_operator(operator, "decide")?;

        // First read only locates the owning account; account_id is
        // immutable, so it cannot go stale before the lock is taken.
        let account_id = self.transactions.get(id)?.account_id();
        let lock = self
            .decision_locks
            .handle(account_id)
            .ok_or(LedgerError::LockPoisoned)?;
        let _unit = lock.lock().map_err(|_| LedgerError::LockPoisoned)?;

        let tx = self.transactions.get(id)?;
        if !tx.is_pending() {
            return Err(TransactionLogError::AlreadyResolved { tx }.into());
        }

        let resolved = match decision {
            Decision::Reject => self.transactions.resolve(id, TransactionStatus::Rejected)?,
            Decision::Approve => self.approve(&tx)?,
        };
        tracing::info!("resolved {resolved}");
        Ok(resolved)
    }

    /// Approval half of the decision unit; runs under the account mutex.
    fn approve(&self, tx: &Transaction) -> Result<Transaction, LedgerError> {
        let delta = match tx.kind() {
            TransactionKind::Deposit => BalanceDelta::Credit(tx.amount()),
            TransactionKind::Withdrawal => BalanceDelta::Debit(tx.amount()),
        };

        // Approval-time re-check: the balance may have changed since the
        // request was submitted.
        if let BalanceDelta::Debit(amount) = delta {
            let balance = self.accounts.get(tx.account_id())?.balance();
            if balance < amount.as_inner() {
                tracing::warn!("refusing approval of {tx}, balance={balance}");
                return Err(LedgerError::InsufficientFunds {
                    tx: tx.clone(),
                    balance,
                });
            }
        }

        self.accounts.adjust_balance(tx.account_id(), delta)?;
        match self.transactions.resolve(tx.id(), TransactionStatus::Approved) {
            Ok(resolved) => Ok(resolved),
            Err(error) => {
                // Unreachable while resolutions stay behind the account
                // mutex; compensate so no half-applied unit survives.
                self.accounts.adjust_balance(tx.account_id(), delta.inverse())?;
                Err(error.into())
            }
        }
    }

    pub fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        Ok(self.accounts.get(id)?)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.accounts.list()?)
    }

    pub fn list_pending(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.transactions.list_pending()?)
    }

    pub fn list_by_account(&self, id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.transactions.list_by_account(id)?)
    }

    /// The externally-configured wallet shown to depositors.
    pub fn deposit_address(&self) -> Result<String, LedgerError> {
        Ok(self.settings.get()?.deposit_address)
    }

    pub fn set_deposit_address(&self, operator: &Principal, address: &str) -> Result<SiteSettings, LedgerError> {
        self.require_operator(operator, "set_deposit_address")?;
        let settings = self.settings.set_deposit_address(address)?;
        tracing::info!("deposit address updated to {}", settings.deposit_address);
        Ok(settings)
    }

    pub fn set_minimums(
        &self,
        operator: &Principal,
        min_deposit: Decimal,
        min_withdraw: Decimal,
    ) -> Result<SiteSettings, LedgerError> {
        self.require_operator(operator, "set_minimums")?;
        Ok(self.settings.set_minimums(min_deposit, min_withdraw)?)
    }

    fn require_operator(&self, principal: &Principal, operation: &'static str) -> Result<(), LedgerError> {
        match principal.role {
            Role::Admin => Ok(()),
            Role::User => Err(LedgerError::OperatorRequired {
                principal: *principal,
                operation,
            }),
        }
    }
}
