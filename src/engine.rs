//! Transaction approval engine.
//!
//! Provides [`LedgerEngine`] which validates submitted deposit and
//! withdrawal requests and applies operator decisions atomically against
//! the [`crate::store`] layer. [`account_locks`] private module provides
//! the per-account serialization of decision units.

mod account_locks;
pub mod ledger_engine;

pub use ledger_engine::LedgerEngine;
pub use ledger_engine::LedgerError;
