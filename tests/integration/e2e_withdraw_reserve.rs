//! Withdrawals never take an account below its reserve floor.

use pda_bank::{
    domain::{error::Error, operations::OperationState},
    infra::{gateway::LedgerGateway, memory::Fault},
};

use super::{TestEnv, scenario_rent};

#[tokio::test]
async fn test_withdraw_down_to_reserve() {
    let env = TestEnv::with_rent(scenario_rent());
    env.ops.create("Dev Phantom").await.unwrap();
    let (bank, _) = env.ops.bank_address().unwrap();

    assert_eq!(env.ledger.lamports(&bank), 890_880);
    env.ops.deposit(&bank, 109_120).await.unwrap();
    assert_eq!(env.ledger.lamports(&bank), 1_000_000);

    let plan = env.ops.plan_withdrawal(&bank).await.unwrap();
    assert_eq!(plan.reserve, 890_880);
    assert_eq!(plan.amount, 109_120);

    let receipt = env.ops.withdraw(&bank).await.unwrap();
    assert_eq!(receipt.amount, Some(109_120));
    assert_eq!(env.ledger.lamports(&bank), 890_880);

    let submitted = env.ledger.submissions();
    let err = env.ops.withdraw(&bank).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InsufficientFunds {
            balance: 890_880,
            reserve: 890_880
        }
    ));
    assert_eq!(env.ledger.submissions(), submitted);
}

#[tokio::test]
async fn test_reserve_matches_gateway_quote() {
    let env = TestEnv::new();
    env.ops.create("quote").await.unwrap();
    let (bank, _) = env.ops.bank_address().unwrap();
    env.ops.deposit(&bank, 42).await.unwrap();

    let account = env.ledger.fetch_account(&bank).await.unwrap();
    let quote = env.ledger.minimum_reserve(account.data_len).await.unwrap();
    let plan = env.ops.plan_withdrawal(&bank).await.unwrap();
    assert_eq!(plan.reserve, quote);
    assert_eq!(plan.amount, 42);
}

#[tokio::test]
async fn test_timeout_leaves_balance_untouched() {
    let env = TestEnv::with_rent(scenario_rent());
    env.ops.create("Dev Phantom").await.unwrap();
    let (bank, _) = env.ops.bank_address().unwrap();
    env.ops.deposit(&bank, 109_120).await.unwrap();

    env.ledger.fail_next_submit(Fault::Timeout);
    let err = env.ops.withdraw(&bank).await.unwrap_err();
    assert_eq!(OperationState::from_error(&err), OperationState::TimedOut);
    assert!(err.is_transient());
    assert_eq!(env.ledger.lamports(&bank), 1_000_000);

    // Nothing is retried automatically; a fresh call goes through.
    env.ops.withdraw(&bank).await.unwrap();
    assert_eq!(env.ledger.lamports(&bank), 890_880);
}
