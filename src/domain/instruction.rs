//! Bank program interface: instruction payloads and their account lists.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::{
    bank::DISCRIMINATOR_LEN,
    error::{Error, Result},
};

/// Discriminator for an instruction, `sha256("global:<name>")[..8]`.
pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}

#[derive(BorshSerialize, BorshDeserialize)]
struct CreateArgs {
    name: String,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct AmountArgs {
    amount: u64,
}

/// The three bank program instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankInstruction {
    Create { name: String },
    Deposit { amount: u64 },
    Withdraw { amount: u64 },
}

impl BankInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            BankInstruction::Create { .. } => "create",
            BankInstruction::Deposit { .. } => "deposit",
            BankInstruction::Withdraw { .. } => "withdraw",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut data = instruction_discriminator(self.name()).to_vec();
        let written = match self {
            BankInstruction::Create { name } => CreateArgs { name: name.clone() }.serialize(&mut data),
            BankInstruction::Deposit { amount } | BankInstruction::Withdraw { amount } => {
                AmountArgs { amount: *amount }.serialize(&mut data)
            }
        };
        written.map_err(|e| Error::Encode(e.to_string()))?;
        Ok(data)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(Error::Decode(format!("instruction data too short: {} bytes", data.len())));
        }
        let (disc, mut rest) = data.split_at(DISCRIMINATOR_LEN);
        let decode_err = |e: std::io::Error| Error::Decode(e.to_string());

        if disc == instruction_discriminator("create") {
            let args = CreateArgs::deserialize(&mut rest).map_err(decode_err)?;
            Ok(BankInstruction::Create { name: args.name })
        } else if disc == instruction_discriminator("deposit") {
            let args = AmountArgs::deserialize(&mut rest).map_err(decode_err)?;
            Ok(BankInstruction::Deposit {
                amount: args.amount,
            })
        } else if disc == instruction_discriminator("withdraw") {
            let args = AmountArgs::deserialize(&mut rest).map_err(decode_err)?;
            Ok(BankInstruction::Withdraw {
                amount: args.amount,
            })
        } else {
            Err(Error::Decode("unknown instruction discriminator".to_string()))
        }
    }

    /// Build the instruction against `bank`, signed and paid for by `user`.
    pub fn into_instruction(self, program_id: Pubkey, bank: Pubkey, user: Pubkey) -> Result<Instruction> {
        Ok(Instruction::new_with_bytes(
            program_id,
            &self.encode()?,
            vec![
                AccountMeta::new(bank, false),
                AccountMeta::new(user, true),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
        ))
    }
}
