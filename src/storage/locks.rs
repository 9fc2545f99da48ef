//! Per-user serialization
//!
//! Every logical ledger operation runs inside one user's unit. Users never
//! share a guard, so work for different users proceeds in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LedgerResult;
use crate::models::UserId;

use super::LedgerStore;

/// Registry of one mutex per user, created on first use
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex serializing `user`'s operations
    pub fn for_user(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(user).or_default())
    }
}

/// Proof that the current thread holds a user's guard.
///
/// Only [`in_user_scope`] hands these out. Helpers that must run inside an
/// existing unit take a `&UserScope` instead of locking again.
#[derive(Debug)]
pub struct UserScope {
    user: UserId,
}

impl UserScope {
    pub fn user(&self) -> UserId {
        self.user
    }
}

/// Run `op` as one atomic unit for `user`.
///
/// A panic inside an earlier unit poisons the mutex without leaving partial
/// rows behind (repositories restore on failed writes), so poisoning is
/// ignored.
pub fn in_user_scope<S, T, F>(store: &S, user: UserId, op: F) -> LedgerResult<T>
where
    S: LedgerStore + ?Sized,
    F: FnOnce(&UserScope) -> LedgerResult<T>,
{
    let lock = store.user_lock(user);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    op(&UserScope { user })
}
