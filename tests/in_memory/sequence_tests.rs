//! Identifier and counter behaviour under concurrent callers.

use eyre::{bail, ensure};
use mockable::DefaultClock;
use mockingbird::config::SequenceConfig;
use mockingbird::persistence::ObjectId;
use mockingbird::sequence::{
    adapters::memory::{InMemoryCounterRepository, InMemorySequenceSource},
    domain::{IdKind, IdPrefix, OwnerSet},
    services::{CounterEngine, IdGenerator, PrefixGenerator},
};
use std::collections::BTreeSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_tasks_never_share_an_identifier() -> eyre::Result<()> {
    let generator = Arc::new(IdGenerator::new(
        Arc::new(InMemorySequenceSource::new()),
        &SequenceConfig { id_batch_size: 7 },
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let shared = Arc::clone(&generator);
        handles.push(tokio::spawn(async move {
            let mut issued = Vec::new();
            for _ in 0..25 {
                issued.push(shared.generate().await?);
            }
            Ok::<_, mockingbird::sequence::services::SequenceError>(issued)
        }));
    }

    let mut seen: BTreeSet<ObjectId> = BTreeSet::new();
    for handle in handles {
        for id in handle.await?? {
            ensure!(seen.insert(id), "identifier {id} issued twice");
        }
    }
    ensure!(seen.len() == 200);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn reporting_identifiers_come_from_their_own_pool() -> eyre::Result<()> {
    let generator = IdGenerator::new(
        Arc::new(InMemorySequenceSource::starting_at(500)),
        &SequenceConfig { id_batch_size: 4 },
    );

    let configuration = generator.generate().await?;
    let reporting = generator.generate_reporting_id().await?;

    ensure!(configuration == ObjectId::new(500));
    ensure!(reporting == ObjectId::new(500));
    ensure!(generator.pending(IdKind::Configuration).await == 3);
    ensure!(generator.pending(IdKind::Reporting).await == 3);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn session_identifiers_carry_the_prefix() -> eyre::Result<()> {
    let generator = IdGenerator::new(
        Arc::new(InMemorySequenceSource::starting_at(90)),
        &SequenceConfig { id_batch_size: 2 },
    );
    let prefixes = PrefixGenerator::new(IdPrefix::new("SES")?);

    let session = prefixes.prefixed(generator.generate_reporting_id().await?);
    ensure!(session.starts_with("SES"));
    let stripped = PrefixGenerator::remove_prefix(&session)?;
    ensure!(stripped.parse::<u64>().is_ok(), "'{stripped}' is not numeric");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_counter_requests_issue_distinct_indices() -> eyre::Result<()> {
    let engine = Arc::new(CounterEngine::new(
        Arc::new(InMemoryCounterRepository::new()),
        Arc::new(DefaultClock),
    ));
    let scope = OwnerSet::new(["system-3", "operation-12"])?;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let shared = Arc::clone(&engine);
        let owners = scope.clone();
        handles.push(tokio::spawn(async move {
            shared.next_index(&owners, "000").await
        }));
    }

    let mut issued = BTreeSet::new();
    for handle in handles {
        let index = handle.await??;
        if !issued.insert(index.clone()) {
            bail!("index {index} issued twice");
        }
    }
    ensure!(issued.first().map(String::as_str) == Some("001"));
    ensure!(issued.last().map(String::as_str) == Some("020"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn owner_sets_in_any_order_share_a_counter() -> eyre::Result<()> {
    let engine = CounterEngine::new(
        Arc::new(InMemoryCounterRepository::new()),
        Arc::new(DefaultClock),
    );

    let first = engine
        .next_index(&OwnerSet::new(["b", "a"])?, "00")
        .await?;
    let second = engine
        .next_index(&OwnerSet::new(["a", "b"])?, "00")
        .await?;

    ensure!(first == "01", "first index was {first}");
    ensure!(second == "02", "second index was {second}");
    ensure!(engine.purge_stale().await? == 0);
    Ok(())
}
