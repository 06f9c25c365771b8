//! The Component Sync Protocol: `setInterface`, the only way registry rows
//! are created or destroyed.
//!
//! The execution order below (preflight, lock, delete consumers, delete
//! producers, insert producers, insert consumers, commit) is load-bearing —
//! see `SPEC_FULL.md` §4.3 for why deleting before inserting and consumers
//! before producers on the delete side (producers before consumers on the
//! insert side) keeps every intermediate state legal under triggers T1/T2.

use super::error::RegistryError;
use super::model::{first_consumer_duplicate, first_producer_duplicate, ConsumerRecord, ProducerRecord};
use super::store;
use sqlx::PgPool;

/// Replace `component`'s rows so that they equal exactly `consumers` and
/// `producers`. Rows belonging to other components are untouched.
#[tracing::instrument(name = "Sync component interfaces", skip_all, fields(component = %component))]
pub async fn set_interface(
    pool: &PgPool,
    component: &str,
    consumers: Vec<ConsumerRecord>,
    producers: Vec<ProducerRecord>,
) -> Result<(), RegistryError> {
    // Preconditions, checked before any DB work: no two records share the
    // 6-tuple dedup key, ignoring `optional`/`deprecated`.
    if let Some(key) = first_consumer_duplicate(&consumers) {
        return Err(RegistryError::DuplicateConsumerEntry(key.to_string()));
    }
    if let Some(key) = first_producer_duplicate(&producers) {
        return Err(RegistryError::DuplicateProducerEntry(key.to_string()));
    }

    let mut tx = pool.begin().await.map_err(RegistryError::from)?;

    store::lock_consumers_exclusive(&mut tx)
        .await
        .map_err(RegistryError::from)?;

    let current_consumers = store::current_consumers(&mut tx, component)
        .await
        .map_err(RegistryError::from)?;
    let current_producers = store::current_producers(&mut tx, component)
        .await
        .map_err(RegistryError::from)?;

    // Delete stale consumer rows before stale producer rows: dropping a
    // consumer can never violate C1, but dropping a producer can violate
    // C2, so producers must still see the post-deletion consumer set.
    for record in &current_consumers {
        if !consumers.contains(record) {
            store::delete_consumer(&mut tx, component, record)
                .await
                .map_err(RegistryError::from)?;
        }
    }
    for record in &current_producers {
        if !producers.contains(record) {
            store::delete_producer(&mut tx, component, record)
                .await
                .map_err(RegistryError::from)?;
        }
    }

    // Insert new producer rows before new consumer rows: a new producer
    // can never violate C1 or C2, but a new consumer can violate C1, so it
    // must see the post-insertion producer set.
    for record in &producers {
        if !current_producers.contains(record) {
            store::insert_producer(&mut tx, component, record)
                .await
                .map_err(RegistryError::from)?;
        }
    }
    for record in &consumers {
        if !current_consumers.contains(record) {
            store::insert_consumer(&mut tx, component, record)
                .await
                .map_err(RegistryError::from)?;
        }
    }

    tx.commit().await.map_err(RegistryError::from)?;
    Ok(())
}
