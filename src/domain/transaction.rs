//! Transaction builder for bank operations.
//!
//! Compiles instructions into a legacy ledger message paid for by the
//! wallet and attaches the wallet's signature.

use solana_sdk::{hash::Hash, instruction::Instruction, message::Message, transaction::Transaction};

use super::{
    error::{Error, Result},
    wallet::Wallet,
};

/// Build and sign a single-signer transaction paid for by the wallet.
pub fn sign_transaction(
    instructions: &[Instruction],
    wallet: &dyn Wallet,
    recent_blockhash: Hash,
) -> Result<Transaction> {
    let payer = wallet.public_address().ok_or(Error::WalletNotConnected)?;
    let message = Message::new_with_blockhash(instructions, Some(&payer), &recent_blockhash);
    if message.header.num_required_signatures != 1 {
        return Err(Error::Wallet(format!(
            "transaction needs {} signers, wallet provides one",
            message.header.num_required_signatures
        )));
    }
    let mut tx = Transaction::new_unsigned(message);
    let signature = wallet.sign_message(&tx.message_data())?;
    tx.signatures = vec![signature];
    Ok(tx)
}
