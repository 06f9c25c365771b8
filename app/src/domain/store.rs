//! Raw `sqlx` access to the *consumers* / *producers* tables.
//!
//! Every function here takes a borrowed `Transaction` so that the caller
//! (the [sync protocol](super::sync)) controls the transaction boundary and
//! the table lock. Nothing in this module opens or commits a transaction.

use super::model::{ConsumerRecord, EndpointKey, ProducerRecord};
use sqlx::{Postgres, Transaction};

/// `LOCK TABLE consumers IN EXCLUSIVE MODE`.
///
/// Serializes concurrent `setInterface` calls against each other and, since
/// trigger T2 reads `consumers`, also blocks producer deletions from
/// racing a consumer insertion.
pub async fn lock_consumers_exclusive(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("LOCK TABLE consumers IN EXCLUSIVE MODE")
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// All consumer rows currently stored for `component`.
pub async fn current_consumers(
    tx: &mut Transaction<'_, Postgres>,
    component: &str,
) -> Result<Vec<ConsumerRecord>, sqlx::Error> {
    let rows = sqlx::query!(
        r#"
        SELECT subcomponent, host, itype, iprimary, isecondary, itertiary, optional
        FROM consumers
        WHERE component = $1
        "#,
        component,
    )
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ConsumerRecord {
            sub_component: row.subcomponent,
            key: EndpointKey {
                host: row.host,
                itype: row.itype,
                primary: row.iprimary,
                secondary: row.isecondary,
                tertiary: row.itertiary,
            },
            optional: row.optional,
        })
        .collect())
}

/// All producer rows currently stored for `component`.
pub async fn current_producers(
    tx: &mut Transaction<'_, Postgres>,
    component: &str,
) -> Result<Vec<ProducerRecord>, sqlx::Error> {
    let rows = sqlx::query!(
        r#"
        SELECT subcomponent, host, itype, iprimary, isecondary, itertiary, deprecated
        FROM producers
        WHERE component = $1
        "#,
        component,
    )
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ProducerRecord {
            sub_component: row.subcomponent,
            key: EndpointKey {
                host: row.host,
                itype: row.itype,
                primary: row.iprimary,
                secondary: row.isecondary,
                tertiary: row.itertiary,
            },
            deprecated: row.deprecated,
        })
        .collect())
}

pub async fn delete_consumer(
    tx: &mut Transaction<'_, Postgres>,
    component: &str,
    record: &ConsumerRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"
        DELETE FROM consumers
        WHERE component = $1 AND subcomponent = $2 AND host = $3 AND itype = $4
          AND iprimary = $5 AND isecondary = $6 AND itertiary = $7 AND optional = $8
        "#,
        component,
        record.sub_component,
        record.key.host,
        record.key.itype,
        record.key.primary,
        record.key.secondary,
        record.key.tertiary,
        record.optional,
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_producer(
    tx: &mut Transaction<'_, Postgres>,
    component: &str,
    record: &ProducerRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"
        DELETE FROM producers
        WHERE component = $1 AND subcomponent = $2 AND host = $3 AND itype = $4
          AND iprimary = $5 AND isecondary = $6 AND itertiary = $7 AND deprecated = $8
        "#,
        component,
        record.sub_component,
        record.key.host,
        record.key.itype,
        record.key.primary,
        record.key.secondary,
        record.key.tertiary,
        record.deprecated,
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn insert_consumer(
    tx: &mut Transaction<'_, Postgres>,
    component: &str,
    record: &ConsumerRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"
        INSERT INTO consumers (component, subcomponent, host, itype, iprimary, isecondary, itertiary, optional)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
        component,
        record.sub_component,
        record.key.host,
        record.key.itype,
        record.key.primary,
        record.key.secondary,
        record.key.tertiary,
        record.optional,
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn insert_producer(
    tx: &mut Transaction<'_, Postgres>,
    component: &str,
    record: &ProducerRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"
        INSERT INTO producers (component, subcomponent, host, itype, iprimary, isecondary, itertiary, deprecated)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
        component,
        record.sub_component,
        record.key.host,
        record.key.itype,
        record.key.primary,
        record.key.secondary,
        record.key.tertiary,
        record.deprecated,
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// All consumer rows across every component, used by the Read Aggregator.
pub async fn all_consumers(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<Vec<(String, ConsumerRecord)>, sqlx::Error> {
    let rows = sqlx::query!(
        r#"
        SELECT component, subcomponent, host, itype, iprimary, isecondary, itertiary, optional
        FROM consumers
        "#,
    )
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.component,
                ConsumerRecord {
                    sub_component: row.subcomponent,
                    key: EndpointKey {
                        host: row.host,
                        itype: row.itype,
                        primary: row.iprimary,
                        secondary: row.isecondary,
                        tertiary: row.itertiary,
                    },
                    optional: row.optional,
                },
            )
        })
        .collect())
}

/// All producer rows across every component, used by the Read Aggregator.
pub async fn all_producers(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<Vec<(String, ProducerRecord)>, sqlx::Error> {
    let rows = sqlx::query!(
        r#"
        SELECT component, subcomponent, host, itype, iprimary, isecondary, itertiary, deprecated
        FROM producers
        "#,
    )
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.component,
                ProducerRecord {
                    sub_component: row.subcomponent,
                    key: EndpointKey {
                        host: row.host,
                        itype: row.itype,
                        primary: row.iprimary,
                        secondary: row.isecondary,
                        tertiary: row.itertiary,
                    },
                    deprecated: row.deprecated,
                },
            )
        })
        .collect())
}
