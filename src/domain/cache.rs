//! In-memory snapshot of every bank account owned by the program.

use std::{collections::BTreeMap, time::Instant};

use futures::TryStreamExt;
use parking_lot::RwLock;
use tracing::debug;

use solana_sdk::pubkey::Pubkey;

use super::{bank::BankAccount, error::Result};
use crate::infra::gateway::LedgerGateway;

#[derive(Default)]
struct Snapshot {
    entries: BTreeMap<Pubkey, BankAccount>,
    refreshed_at: Option<Instant>,
}

/// Address-to-account map rebuilt wholesale on each refresh.
///
/// The cache never merges: whichever refresh completes last defines the
/// contents. A failed refresh leaves the previous snapshot in place.
#[derive(Default)]
pub struct AccountListCache {
    inner: RwLock<Snapshot>,
}

impl AccountListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-enumerate the program's accounts and replace the cache.
    ///
    /// Returns the number of accounts in the new snapshot.
    pub async fn refresh<G: LedgerGateway + ?Sized>(
        &self,
        gateway: &G,
        program_id: &Pubkey,
    ) -> Result<usize> {
        let entries: BTreeMap<Pubkey, BankAccount> = gateway
            .list_program_accounts(program_id)
            .await?
            .try_collect()
            .await?;
        let count = entries.len();

        *self.inner.write() = Snapshot {
            entries,
            refreshed_at: Some(Instant::now()),
        };
        debug!(count, %program_id, "account list refreshed");
        Ok(count)
    }

    /// A copy of the current mapping.
    pub fn snapshot(&self) -> BTreeMap<Pubkey, BankAccount> {
        self.inner.read().entries.clone()
    }

    pub fn get(&self, address: &Pubkey) -> Option<BankAccount> {
        self.inner.read().entries.get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// When the last successful refresh completed.
    pub fn refreshed_at(&self) -> Option<Instant> {
        self.inner.read().refreshed_at
    }
}
