use crate::domain::{self, RegistryError};
use crate::multipart::YamlUpload;
use pavex::request::path::PathParams;
use pavex::{Response, put};
use sqlx::PgPool;

#[PathParams]
pub struct ComponentPath {
    pub component: String,
}

/// Replace one component's declared interfaces with the contents of the
/// attached YAML document.
#[put(path = "/components/{component}/interfaces/yaml")]
#[tracing::instrument(name = "Set component interfaces", skip_all, fields(component = %params.0.component))]
pub async fn set_interface_yaml(
    params: PathParams<ComponentPath>,
    upload: YamlUpload,
    db_pool: &PgPool,
) -> Result<Response, RegistryError> {
    let (consumers, producers) = domain::parser::parse(&upload.0)?;
    domain::sync::set_interface(db_pool, &params.0.component, consumers, producers).await?;
    Ok(Response::ok().set_typed_body("{}"))
}

/// The taxonomy kind names from `SPEC_FULL.md` §7, surfaced in the error
/// body's `error` field so callers can match on it without parsing prose.
fn error_kind(e: &RegistryError) -> &'static str {
    use RegistryError::*;
    match e {
        MalformedDocument(_) => "MalformedDocument",
        SchemaViolation { .. } => "SchemaViolation",
        DuplicateConsumerEntry(_) | DuplicateProducerEntry(_) | InterfaceEntryDuplication(_) => {
            "DuplicateEntry"
        }
        InterfaceEntryConflict(_) => "ReferentialConflict",
        StoreUnavailable(_) => "StoreUnavailable",
    }
}

#[pavex::error_handler]
pub fn registry_error_handler(e: &RegistryError) -> Response {
    use RegistryError::*;
    let response = match e {
        MalformedDocument(_) | SchemaViolation { .. } | DuplicateConsumerEntry(_)
        | DuplicateProducerEntry(_) | InterfaceEntryDuplication(_) => Response::bad_request(),
        InterfaceEntryConflict(_) => Response::conflict(),
        StoreUnavailable(_) => Response::internal_server_error(),
    };
    let body = serde_json::json!({
        "error": error_kind(e),
        "message": e.to_string(),
    });
    response
        .insert_header(
            pavex::http::header::CONTENT_TYPE,
            pavex::http::HeaderValue::from_static("application/json"),
        )
        .set_typed_body(body.to_string())
}
