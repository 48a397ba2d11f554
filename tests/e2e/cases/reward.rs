use crate::e2e::{Environment, EnvironmentConfig};
use alloy::primitives::Address;
use dispatch::{
    constants::DEFAULT_PLACEHOLDER_NAME,
    error::{DispatchError, LedgerError, RewardStage},
    storage::StorageApi,
    types::AssetId,
};
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use std::{collections::HashSet, time::Duration};

#[tokio::test]
async fn reward_creates_placeholder_once() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    env.myriad.set_native_balance(env.faucet, 10u128.pow(15));
    let to = Address::repeat_byte(0xa1);
    let storage = env.dispatcher.storage();

    assert!(storage.read_account(to).await?.is_none());

    let first = env.dispatcher.send_reward(to).await?;
    assert_eq!(first.asset, AssetId::from("MYR"));
    assert_eq!(first.from, env.faucet);
    assert_eq!(first.amount, Decimal::ONE);
    assert_eq!(env.myriad.native_balance_of(to), 10u128.pow(12));

    let account = storage.read_account(to).await?.unwrap();
    assert_eq!(account.display_name, DEFAULT_PLACEHOLDER_NAME);

    env.dispatcher.send_reward(to).await?;

    // the second reward leaves the existing identity alone
    assert_eq!(storage.read_account(to).await?.unwrap(), account);
    assert_eq!(storage.read_transactions(to).await?.len(), 2);

    Ok(())
}

/// Concurrent rewards from the shared faucet never reuse a nonce, even though the node keeps
/// reporting the same one.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rewards_use_unique_nonces() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    env.myriad.set_native_balance(env.faucet, 10u128.pow(15));
    env.myriad.set_account_nonce(env.faucet, 7);
    env.myriad.freeze_nonces();

    let records = try_join_all((0..32u8).map(|idx| {
        let dispatcher = env.dispatcher.clone();
        async move { dispatcher.send_reward(Address::repeat_byte(idx)).await }
    }))
    .await?;

    let nonces = records.iter().map(|record| record.nonce.unwrap()).collect::<HashSet<_>>();
    assert_eq!(nonces, (7..39).collect());
    assert_eq!(env.myriad.submitted().len(), 32);

    Ok(())
}

#[tokio::test]
async fn node_nonce_ahead_of_sequence_wins() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    env.myriad.set_native_balance(env.faucet, 10u128.pow(15));
    env.myriad.freeze_nonces();
    let to = Address::repeat_byte(0xa2);

    assert_eq!(env.dispatcher.send_reward(to).await?.nonce, Some(0));
    assert_eq!(env.dispatcher.send_reward(to).await?.nonce, Some(1));

    // transfers submitted elsewhere moved the node ahead
    env.myriad.set_account_nonce(env.faucet, 10);
    assert_eq!(env.dispatcher.send_reward(to).await?.nonce, Some(10));
    assert_eq!(env.dispatcher.send_reward(to).await?.nonce, Some(11));

    Ok(())
}

#[tokio::test]
async fn token_tip() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    env.acala.set_token_balance(env.faucet, "AUSD", 100 * 10u128.pow(12));
    let to = Address::repeat_byte(0xa3);

    let record = env.dispatcher.send_reward_in(&"AUSD".into(), to).await?;

    assert_eq!(record.amount, Decimal::TEN);
    assert_eq!(env.acala.token_balance_of(to, &"AUSD".into()), 10 * 10u128.pow(12));
    assert_eq!(env.acala.native_balance_of(to), 0);

    Ok(())
}

#[tokio::test]
async fn reward_in_unsupported_asset() -> eyre::Result<()> {
    let env = Environment::setup().await?;

    let err = env.dispatcher.send_reward_in(&"ACA".into(), Address::ZERO).await.unwrap_err();

    assert!(matches!(err, DispatchError::UnsupportedAsset(_)), "{err}");
    assert_eq!(env.acala.connections(), 0);

    Ok(())
}

#[tokio::test]
async fn failed_reward_reports_stage() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let to = Address::repeat_byte(0xa4);

    // unfunded faucet
    let err = env.dispatcher.send_reward(to).await.unwrap_err();

    let DispatchError::Reward(failure) = err else { panic!("expected a reward failure") };
    assert_eq!(failure.stage, RewardStage::Submit);
    assert!(
        matches!(failure.source, DispatchError::Ledger(LedgerError::Rejected(_))),
        "{failure}"
    );
    assert!(env.dispatcher.storage().read_account(to).await?.is_none());
    assert_eq!(env.myriad.disconnections(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn timed_out_reward_reports_stage() -> eyre::Result<()> {
    let env = Environment::setup_with_config(EnvironmentConfig {
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .await?;
    env.myriad.set_native_balance(env.faucet, 10u128.pow(15));
    env.myriad.set_latency(Duration::from_secs(60));
    let to = Address::repeat_byte(0xa5);

    let err = env.dispatcher.send_reward(to).await.unwrap_err();

    let DispatchError::Reward(failure) = err else { panic!("expected a reward failure") };
    assert_eq!(failure.stage, RewardStage::QueryNonce);
    assert!(
        matches!(failure.source, DispatchError::Ledger(LedgerError::Timeout { .. })),
        "{failure}"
    );
    assert!(env.myriad.submitted().is_empty());
    assert!(env.dispatcher.storage().read_transactions(to).await?.is_empty());
    assert!(env.dispatcher.storage().read_account(to).await?.is_none());
    assert_eq!(env.myriad.connections(), 1);
    assert_eq!(env.myriad.disconnections(), 1);

    Ok(())
}
