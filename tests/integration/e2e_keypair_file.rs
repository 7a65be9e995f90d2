//! A wallet loaded from a keypair file drives the same bank.

use pda_bank::domain::wallet::{KeypairWallet, Wallet};

use super::{TestEnv, scenario_rent};

#[tokio::test]
async fn test_keypair_file_round_trip_controls_bank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("id.json");

    let original = KeypairWallet::generate();
    original.write_file(&path).unwrap();
    let loaded = KeypairWallet::from_file(&path).unwrap();
    assert_eq!(loaded.public_address(), original.public_address());

    let env = TestEnv::with_wallet(loaded, scenario_rent());
    assert_eq!(env.owner, original.pubkey());
    env.ops.create("from file").await.unwrap();

    let (bank, _) = env.ops.bank_address().unwrap();
    env.refresh().await;
    assert_eq!(env.cache.get(&bank).unwrap().owner, original.pubkey());
}

#[test]
fn test_garbage_keypair_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("id.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(KeypairWallet::from_file(&path).is_err());
}
