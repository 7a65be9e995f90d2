//! Bank account record layout.
//!
//! On-chain layout: 8-byte discriminator, then the borsh-encoded record,
//! zero-padded to `BANK_ACCOUNT_SPACE`.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use solana_sdk::{account::Account, pubkey::Pubkey};

use super::error::{Error, Result};

/// Allocated size of every bank account.
pub const BANK_ACCOUNT_SPACE: usize = 256;

pub const DISCRIMINATOR_LEN: usize = 8;

/// Longest display name that fits: space - discriminator - string prefix - balance - owner.
pub const MAX_NAME_LEN: usize = BANK_ACCOUNT_SPACE - DISCRIMINATOR_LEN - 4 - 8 - 32;

/// Discriminator for an account type, `sha256("account:<Name>")[..8]`.
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}

pub fn bank_discriminator() -> [u8; DISCRIMINATOR_LEN] {
    account_discriminator("Bank")
}

/// The program's stored record.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BankRecord {
    pub name: String,
    pub balance: u64,
    pub owner: Pubkey,
}

impl BankRecord {
    pub fn new(name: String, owner: Pubkey) -> Self {
        Self {
            name,
            balance: 0,
            owner,
        }
    }

    /// Decode account data, checking the discriminator. Trailing padding is ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(Error::Decode(format!("account data too short: {} bytes", data.len())));
        }
        let (disc, mut rest) = data.split_at(DISCRIMINATOR_LEN);
        if disc != bank_discriminator() {
            return Err(Error::Decode("discriminator mismatch".to_string()));
        }
        BankRecord::deserialize(&mut rest).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Encode into a full, zero-padded account buffer.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(BANK_ACCOUNT_SPACE);
        data.extend_from_slice(&bank_discriminator());
        self.serialize(&mut data)
            .map_err(|e| Error::Encode(e.to_string()))?;
        if data.len() > BANK_ACCOUNT_SPACE {
            return Err(Error::NameTooLong {
                len: self.name.len(),
                max: MAX_NAME_LEN,
            });
        }
        data.resize(BANK_ACCOUNT_SPACE, 0);
        Ok(data)
    }
}

fn serialize_base58<S: Serializer>(key: &Pubkey, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

/// Snapshot of one bank account.
///
/// `balance` is the lamports the account holds, which is what the reserve
/// floor applies to. `recorded_balance` is the program's own tally of deposits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankAccount {
    #[serde(serialize_with = "serialize_base58")]
    pub address: Pubkey,
    #[serde(serialize_with = "serialize_base58")]
    pub owner: Pubkey,
    pub name: String,
    pub balance: u64,
    pub recorded_balance: u64,
    pub data_len: usize,
}

impl BankAccount {
    /// Decode a raw ledger account. The caller checks the owning program.
    pub fn from_ledger(address: Pubkey, account: &Account) -> Result<Self> {
        let record = BankRecord::decode(&account.data)?;
        Ok(Self {
            address,
            owner: record.owner,
            name: record.name,
            balance: account.lamports,
            recorded_balance: record.balance,
            data_len: account.data.len(),
        })
    }
}
