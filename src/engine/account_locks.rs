use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::transaction::AccountId;

/// Mutual exclusion keyed by account id.
///
/// Decision units on the same account serialize on the account's mutex;
/// units on different accounts run fully in parallel. Handles are `Arc`s so
/// a unit keeps its mutex alive without holding the registry lock.
#[derive(Debug, Default)]
pub(in crate::engine) struct AccountLocks(Mutex<HashMap<AccountId, Arc<Mutex<()>>>>);

impl AccountLocks {
    /// Returns the mutex for `id`, creating it on first use. `None` means
    /// the registry lock was poisoned.
    pub(in crate::engine) fn handle(&self, id: AccountId) -> Option<Arc<Mutex<()>>> {
        let mut locks = self.0.lock().ok()?;
        Some(Arc::clone(locks.entry(id).or_default()))
    }
}
