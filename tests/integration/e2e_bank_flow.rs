//! End-to-end bank lifecycle.
//!
//! create -> deposit -> list -> withdraw, checked against ledger balances.

use pda_bank::domain::{
    address::bank_address,
    error::Error,
    operations::{OperationKind, OperationState},
};
use solana_sdk::pubkey::Pubkey;

use super::{STARTING_LAMPORTS, TestEnv};

#[tokio::test]
async fn test_full_lifecycle() {
    let env = TestEnv::new();
    let (bank, _) = env.ops.bank_address().unwrap();

    let created = env.ops.create("Dev Phantom").await.unwrap();
    assert_eq!(created.kind, OperationKind::Create);
    assert_eq!(created.state, OperationState::Confirmed);
    assert_eq!(created.bank, bank);

    let reserve = env.ledger.rent().minimum_balance(256);
    assert_eq!(env.ledger.lamports(&bank), reserve);
    assert_eq!(env.ledger.lamports(&env.owner), STARTING_LAMPORTS - reserve);

    let deposited = env.ops.deposit(&bank, 100_000_000).await.unwrap();
    assert_eq!(deposited.amount, Some(100_000_000));
    assert!(deposited.slot > created.slot);
    assert_eq!(deposited.slot, env.ledger.slot());
    assert_ne!(deposited.signature, created.signature);

    assert_eq!(env.refresh().await, 1);
    let listed = env.cache.get(&bank).unwrap();
    assert_eq!(listed.name, "Dev Phantom");
    assert_eq!(listed.owner, env.owner);
    assert_eq!(listed.balance, reserve + 100_000_000);
    assert_eq!(listed.recorded_balance, 100_000_000);

    let withdrawn = env.ops.withdraw(&bank).await.unwrap();
    assert_eq!(withdrawn.amount, Some(100_000_000));
    assert_eq!(env.ledger.lamports(&bank), reserve);
    assert_eq!(env.ledger.lamports(&env.owner), STARTING_LAMPORTS - reserve);

    // The cache only changes on refresh.
    assert_eq!(env.cache.get(&bank).unwrap().balance, reserve + 100_000_000);
    env.refresh().await;
    assert_eq!(env.cache.get(&bank).unwrap().balance, reserve);
}

#[tokio::test]
async fn test_create_twice_is_already_exists() {
    let env = TestEnv::new();
    env.ops.create("Dev Phantom").await.unwrap();
    let (bank, _) = env.ops.bank_address().unwrap();
    let before = env.ledger.lamports(&bank);

    let err = env.ops.create("Dev Phantom").await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(ref addr) if *addr == bank.to_string()));
    assert_eq!(env.ledger.lamports(&bank), before);

    env.refresh().await;
    assert_eq!(env.cache.get(&bank).unwrap().name, "Dev Phantom");
}

#[test]
fn test_owner_derivation_is_stable() {
    let mut bytes = [0xAA; 32];
    bytes[31] = 0x01;
    let owner = Pubkey::new_from_array(bytes);
    let program_id: Pubkey = pda_bank::config::DEFAULT_PROGRAM_ID.parse().unwrap();

    let (first, bump) = bank_address(&owner, &program_id).unwrap();
    assert_eq!(first.to_string(), "63ZfazatTtw1J85Nr4aCrf62HHoyqqhzsXU58N1Gdb3t");
    assert_eq!(bump, 255);

    let (second, again) = bank_address(&owner, &program_id).unwrap();
    assert_eq!((first, bump), (second, again));
    assert_ne!(first, owner);

    let (other, _) = bank_address(&Pubkey::new_from_array([0xAA; 32]), &program_id).unwrap();
    assert_ne!(first, other);
}

#[tokio::test]
async fn test_deposit_into_someone_elses_bank() {
    let env = TestEnv::new();
    let stranger = Pubkey::new_from_array([7; 32]);
    let (their_bank, _) = bank_address(&stranger, &env.program_id).unwrap();
    env.insert_foreign_bank(their_bank, stranger, "theirs", 2_000_000);

    env.ops.deposit(&their_bank, 500).await.unwrap();
    assert_eq!(env.ledger.lamports(&their_bank), 2_000_500);

    let err = env.ops.withdraw(&their_bank).await.unwrap_err();
    assert!(matches!(err, Error::NotOwner { .. }));
    assert_eq!(env.ledger.lamports(&their_bank), 2_000_500);
}

#[tokio::test]
async fn test_deposit_to_missing_bank_is_rejected() {
    let env = TestEnv::new();
    let (bank, _) = env.ops.bank_address().unwrap();

    let err = env.ops.deposit(&bank, 1_000).await.unwrap_err();
    assert!(matches!(err, Error::SimulationFailed { .. }));
    assert_eq!(env.ledger.lamports(&env.owner), STARTING_LAMPORTS);
}
