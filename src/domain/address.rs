//! Program-derived bank addresses.
//!
//! A derived address is the first bump, searching down from 255, for which
//! `sha256(seeds || bump || program_id || "ProgramDerivedAddress")` is not a
//! valid ed25519 point. Off-curve addresses have no private key, so only the
//! owning program can authorize them.

use solana_sdk::pubkey::{MAX_SEED_LEN, MAX_SEEDS, Pubkey};

use super::error::{Error, Result};

/// Namespace tag for per-owner bank accounts.
pub const BANK_SEED: &[u8] = b"user";

fn check_seeds(seeds: &[&[u8]], limit: usize) -> Result<()> {
    if seeds.len() > limit || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(Error::DerivationExhausted);
    }
    Ok(())
}

/// Compute the address for an explicit seed list, bump included.
///
/// Fails with `DerivationExhausted` when the seeds are out of bounds or the
/// hash lands on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey> {
    check_seeds(seeds, MAX_SEEDS)?;
    Pubkey::create_program_address(seeds, program_id).map_err(|_| Error::DerivationExhausted)
}

/// Find the derived address and its bump for the given seeds.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    // One slot is reserved for the bump.
    check_seeds(seeds, MAX_SEEDS - 1)?;
    Pubkey::try_find_program_address(seeds, program_id).ok_or(Error::DerivationExhausted)
}

/// Derive an address from a namespace tag and the owner's address.
pub fn derive(namespace_tag: &[u8], owner: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address(&[namespace_tag, owner.as_ref()], program_id)
}

/// Derive the bank account address for an owner.
pub fn bank_address(owner: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(BANK_SEED, owner, program_id)
}
