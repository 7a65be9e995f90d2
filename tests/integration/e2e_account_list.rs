//! Account list cache against a live ledger.

use pda_bank::{domain::address::bank_address, infra::memory::Fault};
use solana_sdk::pubkey::Pubkey;

use super::TestEnv;

#[tokio::test]
async fn test_list_includes_every_program_bank() {
    let env = TestEnv::new();
    assert_eq!(env.refresh().await, 0);
    assert!(env.cache.is_empty());

    env.ops.create("mine").await.unwrap();
    for seed in 1..=3u8 {
        let owner = Pubkey::new_from_array([seed; 32]);
        let (address, _) = bank_address(&owner, &env.program_id).unwrap();
        env.insert_foreign_bank(address, owner, &format!("bank {seed}"), 1_000_000);
    }

    // Wallet accounts are not banks.
    assert_eq!(env.refresh().await, 4);
    assert!(env.cache.get(&env.owner).is_none());

    let snapshot = env.cache.snapshot();
    let (mine, _) = env.ops.bank_address().unwrap();
    assert_eq!(snapshot[&mine].name, "mine");
    assert_eq!(
        snapshot.values().filter(|a| a.owner != env.owner).count(),
        3
    );
}

#[tokio::test]
async fn test_writes_do_not_touch_cache() {
    let env = TestEnv::new();
    env.refresh().await;
    let stamp = env.cache.refreshed_at();

    env.ops.create("mine").await.unwrap();
    assert!(env.cache.is_empty());
    assert_eq!(env.cache.refreshed_at(), stamp);

    env.refresh().await;
    assert_eq!(env.cache.len(), 1);
    assert!(env.cache.refreshed_at() > stamp);
}

#[tokio::test]
async fn test_failed_write_keeps_cache() {
    let env = TestEnv::new();
    env.ops.create("mine").await.unwrap();
    env.refresh().await;
    let (bank, _) = env.ops.bank_address().unwrap();

    env.ledger.fail_next_submit(Fault::NetworkUnavailable);
    assert!(env.ops.deposit(&bank, 10).await.is_err());
    assert_eq!(env.refresh().await, 1);
    assert_eq!(
        env.cache.get(&bank).unwrap().balance,
        env.ledger.lamports(&bank)
    );
}
