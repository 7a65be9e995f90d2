//! Integration tests for pda-bank.
//!
//! Every test runs against its own in-process ledger, so tests are isolated
//! and need no network. The ledger verifies the signature and blockhash of
//! each submitted transaction before applying it.

pub mod e2e_account_list;
pub mod e2e_bank_flow;
pub mod e2e_keypair_file;
pub mod e2e_withdraw_reserve;

use std::sync::Arc;

use pda_bank::{
    domain::{
        bank::{BANK_ACCOUNT_SPACE, BankRecord},
        cache::AccountListCache,
        operations::BankOperations,
        wallet::{KeypairWallet, Wallet},
    },
    infra::memory::MemoryLedger,
};
use solana_sdk::{account::Account, pubkey::Pubkey, rent::Rent};

/// Lamports airdropped to the test wallet.
pub const STARTING_LAMPORTS: u64 = 10_000_000_000;

/// Rent schedule whose reserve floor for a bank account is 890,880.
pub fn scenario_rent() -> Rent {
    Rent {
        lamports_per_byte_year: 1_160,
        ..Rent::default()
    }
}

/// Test environment for integration tests.
pub struct TestEnv {
    /// Ledger shared with the operations.
    pub ledger: Arc<MemoryLedger>,
    /// Operations bound to the funded wallet.
    pub ops: BankOperations<Arc<MemoryLedger>>,
    /// Account list cache.
    pub cache: AccountListCache,
    /// Public key of the funded wallet.
    pub owner: Pubkey,
    /// Program the ledger hosts.
    pub program_id: Pubkey,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_rent(Rent::default())
    }

    pub fn with_rent(rent: Rent) -> Self {
        Self::with_wallet(KeypairWallet::generate(), rent)
    }

    pub fn with_wallet(wallet: KeypairWallet, rent: Rent) -> Self {
        let owner = wallet.pubkey();
        let wallet: Arc<dyn Wallet> = Arc::new(wallet);
        let program_id = pda_bank::config::DEFAULT_PROGRAM_ID
            .parse()
            .expect("default program id parses");

        let ledger = Arc::new(MemoryLedger::new(program_id, wallet.clone(), rent));
        ledger
            .airdrop(&owner, STARTING_LAMPORTS)
            .expect("airdrop to fresh ledger");

        Self {
            ops: BankOperations::new(ledger.clone(), wallet, program_id),
            ledger,
            cache: AccountListCache::new(),
            owner,
            program_id,
        }
    }

    /// Place a bank owned by someone else directly into the ledger.
    pub fn insert_foreign_bank(&self, address: Pubkey, owner: Pubkey, name: &str, lamports: u64) {
        let data = BankRecord::new(name.to_string(), owner)
            .encode()
            .expect("name fits");
        assert_eq!(data.len(), BANK_ACCOUNT_SPACE);
        self.ledger.insert_account(
            address,
            Account {
                lamports,
                data,
                owner: self.program_id,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub async fn refresh(&self) -> usize {
        self.cache
            .refresh(self.ledger.as_ref(), &self.program_id)
            .await
            .expect("refresh")
    }
}
