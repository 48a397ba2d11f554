use crate::e2e::{Environment, EnvironmentConfig, aca_ausd};
use alloy::primitives::Address;
use dispatch::{
    claim::SkipReason,
    error::DispatchError,
    storage::StorageApi,
    types::{AssetId, FeeProjection, LiquidityQuote},
};
use std::time::Duration;

fn ids(ids: &[&str]) -> Vec<AssetId> {
    ids.iter().map(|id| AssetId::from(*id)).collect()
}

/// One asset is claimed, one has nothing to claim and one is unreachable: the batch still
/// completes with exactly one record.
#[tokio::test]
async fn batch_isolates_failures() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let signer = env.custodial_signer("person-1")?;
    let beneficiary = Address::repeat_byte(0xb1);

    env.acala.set_native_balance(signer.address(), 1_000);
    env.acala.set_native_fee(FeeProjection { weight: 4, partial_fee: 6 });

    let report =
        env.dispatcher.claim_tips(beneficiary, "person-1", &ids(&["ACA", "AUSD", "DOT"])).await?;

    assert_eq!(report.claimed.len(), 1);
    let record = &report.claimed[0];
    assert_eq!(record.asset, AssetId::from("ACA"));
    assert_eq!(record.from, signer.address());
    assert_eq!(record.to, beneficiary);
    assert_eq!(record.amount, env.asset("ACA").to_human(990)?);
    assert_eq!(env.acala.native_balance_of(beneficiary), 990);

    assert_eq!(report.skipped, vec![(AssetId::from("AUSD"), SkipReason::NoBalance)]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, AssetId::from("DOT"));

    let records = env.dispatcher.storage().read_transactions(beneficiary).await?;
    assert_eq!(records, report.claimed);

    // ACA and AUSD share one connection, which is released before moving to DOT
    assert_eq!(env.acala.connections(), 1);
    assert_eq!(env.acala.disconnections(), 1);

    Ok(())
}

#[tokio::test]
async fn insufficient_balance_is_skipped() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let signer = env.custodial_signer("person-2")?;
    let beneficiary = Address::repeat_byte(0xb2);

    env.acala.set_native_balance(signer.address(), 5);
    env.acala.set_native_fee(FeeProjection { weight: 4, partial_fee: 6 });

    let report = env.dispatcher.claim_tips(beneficiary, "person-2", &ids(&["ACA"])).await?;

    assert!(report.claimed.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(
        report.skipped,
        vec![(AssetId::from("ACA"), SkipReason::InsufficientBalance { balance: 5, fee: 10 })]
    );
    assert!(env.acala.submitted().is_empty());
    assert!(env.dispatcher.storage().read_transactions(beneficiary).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn token_fee_is_priced_through_pool() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let signer = env.custodial_signer("person-3")?;
    let beneficiary = Address::repeat_byte(0xb3);
    let ausd = env.asset("AUSD");

    // 1 AUSD, fee of 0.1 ACA at 0.5 AUSD per ACA
    env.acala.set_token_balance(signer.address(), "AUSD", 10u128.pow(12));
    env.acala.set_token_fee(FeeProjection { weight: 0, partial_fee: 10u128.pow(12) });
    env.acala.set_pool(
        aca_ausd(),
        LiquidityQuote {
            reference_reserve: 2_000 * 10u128.pow(13),
            token_reserve: 1_000 * 10u128.pow(12),
        },
    );

    let report = env.dispatcher.claim_tips(beneficiary, "person-3", &ids(&["AUSD"])).await?;

    assert_eq!(report.claimed.len(), 1, "{report:?}");
    assert_eq!(report.claimed[0].amount, ausd.to_human(95 * 10u128.pow(10))?);
    assert_eq!(env.acala.token_balance_of(beneficiary, &ausd.id), 95 * 10u128.pow(10));

    Ok(())
}

#[tokio::test]
async fn reward_asset_is_never_claimed() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let signer = env.custodial_signer("person-4")?;
    env.myriad.set_native_balance(signer.address(), 1_000);

    let report =
        env.dispatcher.claim_tips(Address::repeat_byte(0xb4), "person-4", &ids(&["MYR"])).await?;

    assert_eq!(report.skipped, vec![(AssetId::from("MYR"), SkipReason::RewardAsset)]);
    assert_eq!(env.myriad.native_balance_of(signer.address()), 1_000);
    assert_eq!(env.myriad.connections(), 0);

    Ok(())
}

#[tokio::test]
async fn unknown_asset_is_rejected_upfront() -> eyre::Result<()> {
    let env = Environment::setup().await?;

    let err = env
        .dispatcher
        .claim_tips(Address::repeat_byte(0xb5), "person-5", &ids(&["ACA", "XYZ"]))
        .await
        .unwrap_err();

    assert!(
        matches!(err, DispatchError::UnsupportedAsset(ref id) if id.as_str() == "XYZ"),
        "{err}"
    );
    assert_eq!(env.acala.connections(), 0);

    Ok(())
}

/// A query timing out is handled like any other per-asset failure.
#[tokio::test(start_paused = true)]
async fn timeout_is_isolated() -> eyre::Result<()> {
    let env = Environment::setup_with_config(EnvironmentConfig {
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .await?;
    let signer = env.custodial_signer("person-6")?;
    env.acala.set_native_balance(signer.address(), 1_000);
    env.acala.set_latency(Duration::from_secs(60));

    let report =
        env.dispatcher.claim_tips(Address::repeat_byte(0xb6), "person-6", &ids(&["ACA"])).await?;

    assert!(report.claimed.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("timeout"), "{}", report.failed[0].1);
    assert_eq!(env.acala.disconnections(), 1);

    Ok(())
}
