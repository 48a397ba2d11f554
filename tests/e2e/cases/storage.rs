//! PostgreSQL storage tests.
//!
//! Require a database at `DATABASE_URL`; run with `cargo test -- --ignored`.

use alloy::primitives::Address;
use chrono::Utc;
use dispatch::{
    nonce::{NonceKey, NonceSequencer},
    storage::{DispatchStorage, StorageApi},
    types::AssetId,
};
use futures_util::future::try_join_all;
use sqlx::PgPool;
use std::collections::HashSet;

async fn storage() -> eyre::Result<DispatchStorage> {
    let pool = PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
    DispatchStorage::migrate(&pool).await?;
    Ok(DispatchStorage::pg(pool))
}

/// A signer no other run has used.
fn fresh_signer() -> Address {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    Address::left_padding_from(&nanos.to_be_bytes())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn pg_nonce_max_rule() -> eyre::Result<()> {
    let storage = storage().await?;
    let key = NonceKey::new(AssetId::from("MYR"), fresh_signer());

    assert_eq!(storage.get_and_advance_nonce(&key, 5).await?, 5);
    assert_eq!(storage.read_nonce(&key).await?, Some(6));
    assert_eq!(storage.get_and_advance_nonce(&key, 3).await?, 6);
    assert_eq!(storage.read_nonce(&key).await?, Some(7));
    assert_eq!(storage.get_and_advance_nonce(&key, 10).await?, 10);
    assert_eq!(storage.read_nonce(&key).await?, Some(11));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn pg_concurrent_allocations() -> eyre::Result<()> {
    let storage = storage().await?;
    // independent sequencers, as if run by separate processes
    let sequencers = [NonceSequencer::new(storage.clone()), NonceSequencer::new(storage.clone())];
    let key = NonceKey::new(AssetId::from("MYR"), fresh_signer());

    let nonces = try_join_all((0..40usize).map(|idx| {
        let sequencer = sequencers[idx % 2].clone();
        let key = key.clone();
        async move { sequencer.allocate(&key, 0).await }
    }))
    .await?;

    assert_eq!(nonces.into_iter().collect::<HashSet<_>>(), (0..40).collect());

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn pg_ensure_account() -> eyre::Result<()> {
    let storage = storage().await?;
    let id = fresh_signer();

    assert!(storage.ensure_account(id, "Unknown").await?);
    assert!(!storage.ensure_account(id, "Unknown").await?);
    let account = storage.read_account(id).await?.unwrap();
    assert_eq!(account.display_name, "Unknown");

    Ok(())
}
