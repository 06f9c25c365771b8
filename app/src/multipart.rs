//! Decodes the `multipart/form-data` body of the YAML-upload endpoint.
//!
//! The original service required exactly one attached file, named
//! `yaml_file`; zero or more than one part with that name is a client
//! error. This extractor reproduces that contract on top of `multer`, the
//! multipart parser used across the `hyper` ecosystem.

use pavex::http::header::CONTENT_TYPE;
use pavex::request::RequestHead;
use pavex::request::body::BufferedBody;
use pavex::{Response, error_handler, methods};

const FIELD_NAME: &str = "yaml_file";

pub struct YamlUpload(pub Vec<u8>);

#[methods]
impl YamlUpload {
    #[request_scoped]
    pub async fn extract(
        request_head: &RequestHead,
        body: &BufferedBody,
    ) -> Result<Self, YamlUploadError> {
        let content_type = request_head
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or(YamlUploadError::MissingContentType)?;
        let boundary =
            multer::parse_boundary(content_type).map_err(|_| YamlUploadError::NotMultipart)?;

        let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body.bytes.clone()) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut attached: Option<Vec<u8>> = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| YamlUploadError::InvalidMultipart(e.to_string()))?
        {
            if field.name() != Some(FIELD_NAME) {
                continue;
            }
            if attached.is_some() {
                return Err(YamlUploadError::WrongFileCount);
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| YamlUploadError::InvalidMultipart(e.to_string()))?;
            attached = Some(bytes.to_vec());
        }

        attached.map(YamlUpload).ok_or(YamlUploadError::WrongFileCount)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum YamlUploadError {
    #[error("the request has no `Content-Type` header")]
    MissingContentType,
    #[error("the request body is not `multipart/form-data`")]
    NotMultipart,
    #[error("the multipart body is malformed: {0}")]
    InvalidMultipart(String),
    #[error("exactly one `{FIELD_NAME}` file must be attached")]
    WrongFileCount,
}

#[error_handler]
pub fn yaml_upload_error(e: &YamlUploadError) -> Response {
    let body = serde_json::json!({
        "error": "MalformedDocument",
        "message": e.to_string(),
    });
    Response::bad_request()
        .insert_header(
            pavex::http::header::CONTENT_TYPE,
            pavex::http::HeaderValue::from_static("application/json"),
        )
        .set_typed_body(body.to_string())
}
