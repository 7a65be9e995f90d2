//! Create, deposit and withdraw against the bank program.
//!
//! Each operation derives or locates its target, builds the instruction,
//! submits it once through the gateway and reports the terminal state. There
//! are no retries and no cache writes; callers refresh explicitly.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use strum::Display;
use tracing::{debug, info, warn};

use super::{
    address::bank_address,
    bank::{BankAccount, MAX_NAME_LEN},
    error::{Error, Result},
    instruction::BankInstruction,
    wallet::Wallet,
};
use crate::infra::gateway::LedgerGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OperationKind {
    Create,
    Deposit,
    Withdraw,
}

/// Lifecycle of one submission: `Idle -> Submitting -> {Confirmed, Rejected, TimedOut}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OperationState {
    Idle,
    Submitting,
    Confirmed,
    Rejected,
    TimedOut,
}

impl OperationState {
    /// Terminal state reached by a failed submission.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Timeout { .. } => OperationState::TimedOut,
            _ => OperationState::Rejected,
        }
    }
}

/// Outcome of a confirmed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub kind: OperationKind,
    pub bank: Pubkey,
    pub amount: Option<u64>,
    pub signature: String,
    pub slot: u64,
    pub state: OperationState,
}

/// A withdrawal computed from live account state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalPlan {
    pub account: BankAccount,
    pub reserve: u64,
    pub amount: u64,
}

pub struct BankOperations<G> {
    gateway: G,
    wallet: Arc<dyn Wallet>,
    program_id: Pubkey,
}

impl<G: LedgerGateway> BankOperations<G> {
    pub fn new(gateway: G, wallet: Arc<dyn Wallet>, program_id: Pubkey) -> Self {
        Self {
            gateway,
            wallet,
            program_id,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// The connected owner's address.
    pub fn owner(&self) -> Result<Pubkey> {
        self.wallet.public_address().ok_or(Error::WalletNotConnected)
    }

    /// The connected owner's bank address and bump.
    pub fn bank_address(&self) -> Result<(Pubkey, u8)> {
        bank_address(&self.owner()?, &self.program_id)
    }

    /// Create the owner's bank account with a display name.
    pub async fn create(&self, display_name: &str) -> Result<Receipt> {
        if display_name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong {
                len: display_name.len(),
                max: MAX_NAME_LEN,
            });
        }
        let owner = self.owner()?;
        let (bank, bump) = bank_address(&owner, &self.program_id)?;
        debug!(%bank, bump, "derived bank address");

        let instruction = BankInstruction::Create {
            name: display_name.to_string(),
        };
        self.submit(OperationKind::Create, bank, None, instruction, owner)
            .await
            .map_err(|e| {
                if e.is_account_in_use() {
                    Error::AlreadyExists(bank.to_string())
                } else {
                    e
                }
            })
    }

    /// Deposit `amount` lamports from the owner into `target`.
    pub async fn deposit(&self, target: &Pubkey, amount: u64) -> Result<Receipt> {
        if amount == 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let owner = self.owner()?;
        self.submit(
            OperationKind::Deposit,
            *target,
            Some(amount),
            BankInstruction::Deposit { amount },
            owner,
        )
        .await
    }

    /// Compute how much can leave `target` without dropping below its
    /// reserve floor. Reads live state, never a cached snapshot.
    pub async fn plan_withdrawal(&self, target: &Pubkey) -> Result<WithdrawalPlan> {
        let owner = self.owner()?;
        let account = self.gateway.fetch_account(target).await?;
        if account.owner != owner {
            return Err(Error::NotOwner {
                bank: target.to_string(),
                owner: account.owner.to_string(),
            });
        }

        let reserve = self.gateway.minimum_reserve(account.data_len).await?;
        let amount = account.balance.saturating_sub(reserve);
        if amount == 0 {
            return Err(Error::InsufficientFunds {
                balance: account.balance,
                reserve,
            });
        }
        Ok(WithdrawalPlan {
            account,
            reserve,
            amount,
        })
    }

    /// Withdraw everything above the reserve floor from `target`.
    pub async fn withdraw(&self, target: &Pubkey) -> Result<Receipt> {
        let plan = self.plan_withdrawal(target).await?;
        debug!(
            bank = %target,
            balance = plan.account.balance,
            reserve = plan.reserve,
            amount = plan.amount,
            "withdrawal planned"
        );
        self.submit(
            OperationKind::Withdraw,
            *target,
            Some(plan.amount),
            BankInstruction::Withdraw {
                amount: plan.amount,
            },
            plan.account.owner,
        )
        .await
    }

    async fn submit(
        &self,
        kind: OperationKind,
        bank: Pubkey,
        amount: Option<u64>,
        instruction: BankInstruction,
        user: Pubkey,
    ) -> Result<Receipt> {
        let mut state = OperationState::Idle;
        let instruction = instruction.into_instruction(self.program_id, bank, user)?;
        debug!(%kind, %bank, data = %hex::encode(&instruction.data), %state, "operation built");

        state = OperationState::Submitting;
        debug!(%kind, %bank, %state, "submitting");

        match self.gateway.submit(instruction).await {
            Ok(confirmation) => {
                state = OperationState::Confirmed;
                info!(%kind, %bank, signature = %confirmation.signature, %state, "operation confirmed");
                Ok(Receipt {
                    kind,
                    bank,
                    amount,
                    signature: confirmation.signature,
                    slot: confirmation.slot,
                    state,
                })
            }
            Err(e) => {
                state = OperationState::from_error(&e);
                warn!(%kind, %bank, %state, error = %e, "operation failed");
                Err(e)
            }
        }
    }
}
