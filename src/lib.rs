//! Approval-gated account ledger.
//!
//! Users submit deposit and withdrawal requests against their account; an
//! operator approves or rejects each pending request, and approval
//! atomically adjusts the stored balance. The invariant defended throughout
//! is that every balance equals the signed sum of its approved
//! transactions.
//!
//! - [`transaction`] — ids, kinds, lifecycle statuses and the immutable
//!   request record.
//! - [`account`] — the account model and the checked balance mutations.
//! - [`store`] — lock-guarded account, transaction-log and settings stores.
//! - [`engine`] — [`engine::LedgerEngine`], the submission/decision state
//!   machine.
//! - [`command`] and [`report`] — CSV wire models for the batch replay
//!   driver.

pub mod account;
pub mod command;
pub mod engine;
pub mod report;
pub mod store;
pub mod transaction;
