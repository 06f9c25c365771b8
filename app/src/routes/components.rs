use crate::domain::{self, RegistryError};
use pavex::{Response, get};
use sqlx::PgPool;

/// Dump every registered component, grouped with its declared consumers and
/// producers.
#[get(path = "/components")]
#[tracing::instrument(name = "List registered components", skip_all)]
pub async fn get_components(db_pool: &PgPool) -> Result<Response, RegistryError> {
    let components = domain::aggregator::get_components(db_pool).await?;
    let body = serde_json::to_vec(&components)
        .map_err(|e| RegistryError::StoreUnavailable(sqlx::Error::Decode(e.into())))?;
    Ok(Response::ok()
        .insert_header(
            pavex::http::header::CONTENT_TYPE,
            pavex::http::HeaderValue::from_static("application/json"),
        )
        .set_typed_body(body))
}
