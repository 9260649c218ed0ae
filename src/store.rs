//! Durable in-memory stores backing the ledger engine.
//!
//! Each store guards its records with a [`std::sync::RwLock`] so that
//! callers on different records proceed in parallel while every mutation
//! runs as one unit with respect to the rest of the store. Lock poisoning
//! surfaces as a dedicated storage-failure variant on each store's error.

pub mod accounts;
pub mod settings;
pub mod transactions;

pub use accounts::AccountStore;
pub use accounts::AccountStoreError;
pub use accounts::BalanceDelta;
pub use settings::SettingsStore;
pub use settings::SettingsStoreError;
pub use settings::SiteSettings;
pub use transactions::TransactionLog;
pub use transactions::TransactionLogError;
