//! The Read Aggregator: `getComponents`, a full dump of the registry
//! grouped by component name.

use super::error::RegistryError;
use super::model::Component;
use super::store;
use sqlx::PgPool;
use std::collections::BTreeMap;

/// Return every component that has at least one consumer or producer row,
/// with its rows grouped under it.
///
/// Both `SELECT`s run inside one `REPEATABLE READ` read-only transaction so
/// that they observe the same snapshot; the aggregator does not need to be
/// linearizable with concurrent writers, only internally consistent.
#[tracing::instrument(name = "Aggregate registered components", skip_all)]
pub async fn get_components(pool: &PgPool) -> Result<Vec<Component>, RegistryError> {
    let mut tx = pool
        .begin_with("BEGIN ISOLATION LEVEL REPEATABLE READ READ ONLY")
        .await
        .map_err(RegistryError::from)?;

    let consumers = store::all_consumers(&mut tx).await.map_err(RegistryError::from)?;
    let producers = store::all_producers(&mut tx).await.map_err(RegistryError::from)?;

    tx.commit().await.map_err(RegistryError::from)?;

    let mut by_component: BTreeMap<String, Component> = BTreeMap::new();
    for (component_name, record) in consumers {
        by_component
            .entry(component_name.clone())
            .or_insert_with(|| Component {
                name: component_name,
                consumers: Vec::new(),
                producers: Vec::new(),
            })
            .consumers
            .push(record);
    }
    for (component_name, record) in producers {
        by_component
            .entry(component_name.clone())
            .or_insert_with(|| Component {
                name: component_name,
                consumers: Vec::new(),
                producers: Vec::new(),
            })
            .producers
            .push(record);
    }

    Ok(by_component.into_values().collect())
}
