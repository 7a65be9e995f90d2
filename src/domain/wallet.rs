//! Wallet collaborator: the owner's identity and signing capability.

use std::path::Path;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer, read_keypair_file, write_keypair_file},
    signer::keypair::keypair_from_seed,
};

use super::error::{Error, Result};

/// Anything that can identify the owner and sign on their behalf.
pub trait Wallet: Send + Sync {
    /// The owner's address, or `None` until the wallet is connected.
    fn public_address(&self) -> Option<Pubkey>;

    /// Sign a serialized transaction message.
    fn sign_message(&self, message: &[u8]) -> Result<Signature>;
}

/// A wallet backed by a local ed25519 keypair.
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Load from raw bytes: a 32-byte secret, or 64 bytes (secret || public).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let keypair = match bytes.len() {
            32 => keypair_from_seed(bytes)
                .map_err(|e| Error::Wallet(format!("invalid secret key: {e}")))?,
            64 => Keypair::try_from(bytes)
                .map_err(|e| Error::Wallet(format!("invalid keypair: {e}")))?,
            n => {
                return Err(Error::Wallet(format!(
                    "invalid keypair length: expected 32 or 64 bytes, got {n}"
                )));
            }
        };
        Ok(Self { keypair })
    }

    /// Load a keypair file in the JSON byte-array format written by the
    /// ledger's CLI tooling.
    pub fn from_file(path: &Path) -> Result<Self> {
        let keypair = read_keypair_file(path)
            .map_err(|e| Error::Wallet(format!("failed to read {}: {e}", path.display())))?;
        Ok(Self { keypair })
    }

    /// Write the keypair in the same JSON byte-array format.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        write_keypair_file(&self.keypair, path)
            .map_err(|e| Error::Wallet(format!("failed to write {}: {e}", path.display())))?;
        Ok(())
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

impl Wallet for KeypairWallet {
    fn public_address(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.keypair.sign_message(message))
    }
}
