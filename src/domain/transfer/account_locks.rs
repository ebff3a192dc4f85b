//! Per-account serialization of transfer flows.
//!
//! A flow holds every account it snapshots or charges (sender, receiver and
//! fee payer) from the first balance read until verification, so no other
//! flow can move lamports on those accounts in between. Flows over disjoint
//! accounts proceed concurrently. Accounts are always acquired in ascending
//! `Pubkey` order, so two flows over overlapping sets cannot deadlock.
//!
//! Entries are removed from the map once no flow holds or waits on them.

use dashmap::DashMap;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<Pubkey, Arc<Mutex<()>>>;

#[derive(Debug, Default, Clone)]
pub struct AccountLocks {
    locks: Arc<LockMap>, // account -> flow lock
}

/// Holds a set of account locks until dropped.
#[derive(Debug)]
pub struct AccountGuard {
    held: Vec<(Pubkey, OwnedMutexGuard<()>)>,
    locks: Arc<LockMap>,
}

impl AccountGuard {
    pub fn accounts(&self) -> impl Iterator<Item = &Pubkey> {
        self.held.iter().map(|(account, _)| account)
    }
}

impl Drop for AccountGuard {
    fn drop(&mut self) {
        for (account, guard) in self.held.drain(..).rev() {
            drop(guard);
            // Only the map's own handle left: nobody holds or waits on it.
            self.locks
                .remove_if(&account, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other flow holds any of `accounts`, then holds all of
    /// them until the returned guard is dropped. Duplicates are locked once.
    pub async fn lock_all(&self, accounts: &[Pubkey]) -> AccountGuard {
        let mut ordered = accounts.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut held = Vec::with_capacity(ordered.len());
        for account in ordered {
            let lock = self
                .locks
                .entry(account)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            held.push((account, lock.lock_owned().await));
        }

        AccountGuard {
            held,
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of accounts currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
