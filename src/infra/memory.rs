//! In-process ledger for offline use and tests.
//!
//! Executes the bank program's rules against an in-memory account map. Every
//! submission is compiled into a signed transaction whose signatures and
//! blockhash are checked before it is applied, and is applied atomically.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use parking_lot::Mutex;
use solana_sdk::{
    account::Account,
    hash::{Hash, hash},
    instruction::Instruction,
    pubkey::Pubkey,
    rent::Rent,
    system_program,
    transaction::Transaction,
};
use tracing::debug;

use crate::domain::{
    address::bank_address,
    bank::{BANK_ACCOUNT_SPACE, BankAccount, BankRecord, bank_discriminator},
    error::{Error, Result},
    instruction::BankInstruction,
    transaction::sign_transaction,
    wallet::Wallet,
};
use crate::infra::gateway::{AccountStream, Confirmation, LedgerGateway};

/// A failure to inject into the next submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    NetworkUnavailable,
    Timeout,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: BTreeMap<Pubkey, Account>,
    slot: u64,
    blockhash: Hash,
}

impl LedgerState {
    fn lamports(&self, address: &Pubkey) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.lamports)
    }

    fn credit(&mut self, address: &Pubkey, lamports: u64) -> Result<()> {
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| Account::new(0, 0, &system_program::ID));
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or_else(|| rejected("lamport overflow", Vec::new()))?;
        Ok(())
    }

    fn debit(&mut self, address: &Pubkey, lamports: u64) -> Result<()> {
        let account = self
            .accounts
            .get_mut(address)
            .ok_or_else(|| rejected(&format!("account {address} has no lamports"), Vec::new()))?;
        account.lamports = account.lamports.checked_sub(lamports).ok_or_else(|| {
            rejected(
                "insufficient lamports",
                vec![format!("Transfer: insufficient lamports, need {lamports}")],
            )
        })?;
        Ok(())
    }
}

fn rejected(message: &str, logs: Vec<String>) -> Error {
    Error::SimulationFailed {
        message: message.to_string(),
        logs,
    }
}

/// In-memory ledger hosting a single bank program.
pub struct MemoryLedger {
    program_id: Pubkey,
    rent: Rent,
    wallet: Arc<dyn Wallet>,
    state: Mutex<LedgerState>,
    fault: Mutex<Option<Fault>>,
    submissions: Mutex<usize>,
}

impl MemoryLedger {
    pub fn new(program_id: Pubkey, wallet: Arc<dyn Wallet>, rent: Rent) -> Self {
        Self {
            program_id,
            rent,
            wallet,
            state: Mutex::new(LedgerState::default()),
            fault: Mutex::new(None),
            submissions: Mutex::new(0),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn rent(&self) -> &Rent {
        &self.rent
    }

    /// Credit lamports to a wallet account.
    pub fn airdrop(&self, to: &Pubkey, lamports: u64) -> Result<()> {
        self.state.lock().credit(to, lamports)
    }

    /// Lamports held by any account, zero if it does not exist.
    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.state.lock().lamports(address)
    }

    /// Place an account directly, bypassing the program.
    pub fn insert_account(&self, address: Pubkey, account: Account) {
        self.state.lock().accounts.insert(address, account);
    }

    /// Make the next submission fail with `fault` without touching state.
    pub fn fail_next_submit(&self, fault: Fault) {
        *self.fault.lock() = Some(fault);
    }

    /// Number of submissions that reached the ledger, successful or not.
    pub fn submissions(&self) -> usize {
        *self.submissions.lock()
    }

    /// Slot of the last applied transaction.
    pub fn slot(&self) -> u64 {
        self.state.lock().slot
    }

    /// Blockhash the next transaction must reference.
    fn latest_blockhash(&self) -> Hash {
        self.state.lock().blockhash
    }

    /// Verify and apply a signed transaction.
    pub fn process_transaction(&self, tx: &Transaction) -> Result<Confirmation> {
        tx.verify()
            .map_err(|e| rejected(&format!("signature verification failed: {e}"), Vec::new()))?;
        let message = &tx.message;

        let mut state = self.state.lock();
        if message.recent_blockhash != state.blockhash {
            return Err(rejected("Blockhash not found", Vec::new()));
        }

        let key = |i: u8| -> Result<Pubkey> {
            message
                .account_keys
                .get(i as usize)
                .copied()
                .ok_or_else(|| rejected(&format!("account index {i} out of range"), Vec::new()))
        };

        // Work on a copy so a failing instruction leaves nothing applied.
        let mut next = state.clone();
        for ix in &message.instructions {
            let program_id = key(ix.program_id_index)?;
            let accounts = ix
                .accounts
                .iter()
                .map(|&i| Ok((key(i)?, message.is_signer(i as usize))))
                .collect::<Result<Vec<_>>>()?;
            self.execute(&mut next, &program_id, &accounts, &ix.data)?;
        }

        next.slot += 1;
        next.blockhash = hash(next.blockhash.as_ref());
        *state = next;

        Ok(Confirmation {
            signature: tx.signatures.first().map(ToString::to_string).unwrap_or_default(),
            slot: state.slot,
        })
    }

    fn execute(
        &self,
        state: &mut LedgerState,
        program_id: &Pubkey,
        accounts: &[(Pubkey, bool)],
        data: &[u8],
    ) -> Result<()> {
        if *program_id != self.program_id {
            return Err(rejected(&format!("program {program_id} is not deployed"), Vec::new()));
        }
        let &[(bank, _), (user, user_signed), (system, _)] = accounts else {
            return Err(rejected("NotEnoughAccountKeys", Vec::new()));
        };
        if !user_signed {
            return Err(rejected("missing required signature for user", Vec::new()));
        }
        if system != system_program::ID {
            return Err(rejected("InvalidProgramId", Vec::new()));
        }
        let instruction = BankInstruction::decode(data)
            .map_err(|e| rejected(&format!("InstructionDidNotDeserialize: {e}"), Vec::new()))?;
        debug!(instruction = instruction.name(), %bank, "executing");

        match instruction {
            BankInstruction::Create { name } => {
                let (expected, _) = bank_address(&user, &self.program_id)?;
                if bank != expected {
                    return Err(rejected("ConstraintSeeds: bank address mismatch", Vec::new()));
                }
                if state.accounts.contains_key(&bank) {
                    return Err(rejected(
                        "custom program error: 0x0",
                        vec![format!(
                            "Allocate: account Address {{ address: {bank}, base: None }} already in use"
                        )],
                    ));
                }
                let data = BankRecord::new(name, user)
                    .encode()
                    .map_err(|e| rejected(&e.to_string(), Vec::new()))?;
                let lamports = self.rent.minimum_balance(BANK_ACCOUNT_SPACE);
                state.debit(&user, lamports)?;
                state.accounts.insert(
                    bank,
                    Account {
                        lamports,
                        data,
                        owner: self.program_id,
                        executable: false,
                        rent_epoch: 0,
                    },
                );
            }
            BankInstruction::Deposit { amount } => {
                let mut record = self.load_bank(state, &bank)?;
                state.debit(&user, amount)?;
                state.credit(&bank, amount)?;
                record.balance = record
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| rejected("arithmetic overflow", Vec::new()))?;
                self.store_bank(state, &bank, &record)?;
            }
            BankInstruction::Withdraw { amount } => {
                let mut record = self.load_bank(state, &bank)?;
                if record.owner != user {
                    return Err(rejected("IncorrectProgramId", Vec::new()));
                }
                let data_len = state.accounts.get(&bank).map_or(0, |a| a.data.len());
                let reserve = self.rent.minimum_balance(data_len);
                let available = state.lamports(&bank).saturating_sub(reserve);
                if available < amount {
                    return Err(rejected(
                        "insufficient funds for instruction",
                        vec![format!("withdraw {amount} exceeds available {available}")],
                    ));
                }
                record.balance = record
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| rejected("arithmetic overflow", Vec::new()))?;
                state.debit(&bank, amount)?;
                state.credit(&user, amount)?;
                self.store_bank(state, &bank, &record)?;
            }
        }
        Ok(())
    }

    fn load_bank(&self, state: &LedgerState, bank: &Pubkey) -> Result<BankRecord> {
        let account = state
            .accounts
            .get(bank)
            .ok_or_else(|| rejected("AccountNotInitialized", Vec::new()))?;
        if account.owner != self.program_id {
            return Err(rejected("AccountOwnedByWrongProgram", Vec::new()));
        }
        BankRecord::decode(&account.data)
            .map_err(|e| rejected(&format!("AccountDidNotDeserialize: {e}"), Vec::new()))
    }

    fn store_bank(&self, state: &mut LedgerState, bank: &Pubkey, record: &BankRecord) -> Result<()> {
        let data = record.encode()?;
        if let Some(account) = state.accounts.get_mut(bank) {
            account.data = data;
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerGateway for MemoryLedger {
    async fn fetch_account(&self, address: &Pubkey) -> Result<BankAccount> {
        let state = self.state.lock();
        let account = state
            .accounts
            .get(address)
            .ok_or_else(|| Error::NotFound(address.to_string()))?;
        if account.owner != self.program_id {
            return Err(Error::Decode(format!("{address} is not a bank account")));
        }
        BankAccount::from_ledger(*address, account)
    }

    async fn list_program_accounts(&self, program_id: &Pubkey) -> Result<AccountStream> {
        let discriminator = bank_discriminator();
        let matching: Vec<(Pubkey, Account)> = self
            .state
            .lock()
            .accounts
            .iter()
            .filter(|(_, a)| &a.owner == program_id && a.data.starts_with(&discriminator))
            .map(|(k, a)| (*k, a.clone()))
            .collect();

        Ok(stream::iter(matching)
            .map(|(address, account)| {
                BankAccount::from_ledger(address, &account).map(|bank| (address, bank))
            })
            .boxed())
    }

    async fn minimum_reserve(&self, data_size: usize) -> Result<u64> {
        Ok(self.rent.minimum_balance(data_size))
    }

    async fn submit(&self, instruction: Instruction) -> Result<Confirmation> {
        if let Some(fault) = self.fault.lock().take() {
            return Err(match fault {
                Fault::NetworkUnavailable => {
                    Error::NetworkUnavailable("connection refused".to_string())
                }
                Fault::Timeout => Error::Timeout {
                    what: "confirmation".to_string(),
                    secs: 0,
                },
            });
        }
        *self.submissions.lock() += 1;

        let tx = sign_transaction(&[instruction], self.wallet.as_ref(), self.latest_blockhash())?;
        self.process_transaction(&tx)
    }
}
