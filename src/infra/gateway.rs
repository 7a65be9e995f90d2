//! Ledger access seam. Every network round-trip the client makes goes
//! through `LedgerGateway`.

use std::{pin::Pin, sync::Arc};

use async_trait::async_trait;
use futures::Stream;

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::domain::{bank::BankAccount, error::Result};

/// Single-pass listing of program accounts.
pub type AccountStream = Pin<Box<dyn Stream<Item = Result<(Pubkey, BankAccount)>> + Send>>;

/// A submission the ledger acknowledged as final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub signature: String,
    pub slot: u64,
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Point read of a bank account. `NotFound` if nothing lives at `address`.
    async fn fetch_account(&self, address: &Pubkey) -> Result<BankAccount>;

    /// Enumerate every bank account owned by `program_id`.
    async fn list_program_accounts(&self, program_id: &Pubkey) -> Result<AccountStream>;

    /// Reserve floor for an account holding `data_size` bytes.
    async fn minimum_reserve(&self, data_size: usize) -> Result<u64>;

    /// Sign, send and wait for confirmation of a single instruction.
    async fn submit(&self, instruction: Instruction) -> Result<Confirmation>;
}

#[async_trait]
impl<G: LedgerGateway + ?Sized> LedgerGateway for Arc<G> {
    async fn fetch_account(&self, address: &Pubkey) -> Result<BankAccount> {
        (**self).fetch_account(address).await
    }

    async fn list_program_accounts(&self, program_id: &Pubkey) -> Result<AccountStream> {
        (**self).list_program_accounts(program_id).await
    }

    async fn minimum_reserve(&self, data_size: usize) -> Result<u64> {
        (**self).minimum_reserve(data_size).await
    }

    async fn submit(&self, instruction: Instruction) -> Result<Confirmation> {
        (**self).submit(instruction).await
    }
}
