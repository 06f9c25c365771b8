//! Deserializes a multi-document interface declaration stream into flat
//! [`ConsumerRecord`](super::model::ConsumerRecord) /
//! [`ProducerRecord`](super::model::ProducerRecord) lists.
//!
//! Mirrors the original service's JSON-schema-driven parser one-to-one:
//! each document is validated, then every `(host, type)` group's `values`
//! list is expanded into one record per value, stamped with the enclosing
//! document's `sub-component`.

use super::error::RegistryError;
use super::model::{ConsumerRecord, EndpointKey, ProducerRecord};
use serde::Deserialize;

const SUPPORTED_API_VERSION: i64 = 1;
const DECLARATION_KIND: &str = "InterfaceDeclaration";

#[derive(Debug, serde::Deserialize)]
struct Declaration {
    #[serde(rename = "apiVersion")]
    api_version: i64,
    kind: String,
    #[serde(rename = "sub-component", default)]
    sub_component: String,
    #[serde(default)]
    producers: Vec<Group>,
    #[serde(default)]
    consumers: Vec<Group>,
}

#[derive(Debug, serde::Deserialize)]
struct Group {
    host: String,
    #[serde(rename = "type")]
    itype: String,
    #[serde(default)]
    values: Vec<serde_yaml::Value>,
}

/// `value` must be a mapping — one `values` entry that is itself a scalar or
/// a sequence (e.g. `values: [123]`) has no `primary`/`secondary`/etc. fields
/// to read and is a schema violation in its own right.
fn require_mapping(value: &serde_yaml::Value, path: &str) -> Result<(), RegistryError> {
    if value.as_mapping().is_some() {
        Ok(())
    } else {
        Err(RegistryError::SchemaViolation {
            path: path.to_string(),
            reason: format!("expected a mapping, got {}", describe_kind(value)),
        })
    }
}

fn describe_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// A present-but-wrong-typed field (e.g. `primary: 123`) is a schema
/// violation; an absent or explicitly `null` field falls back to `default`.
fn string_field(value: &serde_yaml::Value, field: &str, default: &str, path: &str) -> Result<String, RegistryError> {
    match value.get(field) {
        None | Some(serde_yaml::Value::Null) => Ok(default.to_string()),
        Some(serde_yaml::Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(RegistryError::SchemaViolation {
            path: format!("{path}.{field}"),
            reason: format!("expected a string, got {}", describe_kind(other)),
        }),
    }
}

/// A present-but-wrong-typed field (e.g. `optional: "yes"`) is a schema
/// violation; an absent or explicitly `null` field falls back to `default`.
fn bool_field(value: &serde_yaml::Value, field: &str, default: bool, path: &str) -> Result<bool, RegistryError> {
    match value.get(field) {
        None | Some(serde_yaml::Value::Null) => Ok(default),
        Some(serde_yaml::Value::Bool(b)) => Ok(*b),
        Some(other) => Err(RegistryError::SchemaViolation {
            path: format!("{path}.{field}"),
            reason: format!("expected a boolean, got {}", describe_kind(other)),
        }),
    }
}

/// Parse a multi-document YAML stream into flat consumer and producer
/// record lists.
///
/// Equivalent to the original `YamlParser.parse`: `yaml.safe_load_all`
/// followed by schema validation and cross-product expansion.
pub fn parse(yaml_content: &[u8]) -> Result<(Vec<ConsumerRecord>, Vec<ProducerRecord>), RegistryError> {
    let text = std::str::from_utf8(yaml_content)
        .map_err(|e| RegistryError::MalformedDocument(e.to_string()))?;

    let mut consumer_records = Vec::new();
    let mut producer_records = Vec::new();

    for (doc_index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let raw = serde_yaml::Value::deserialize(document)
            .map_err(|e| RegistryError::MalformedDocument(e.to_string()))?;
        if raw.is_null() {
            // An empty `---` document; nothing to contribute.
            continue;
        }
        let path = format!("documents[{doc_index}]");
        let declaration = validate_declaration(&raw, &path)?;

        for (group_index, group) in declaration.producers.iter().enumerate() {
            for (value_index, value) in group.values.iter().enumerate() {
                let value_path = format!("{path}.producers[{group_index}].values[{value_index}]");
                require_mapping(value, &value_path)?;
                producer_records.push(ProducerRecord {
                    sub_component: declaration.sub_component.clone(),
                    key: EndpointKey {
                        host: group.host.clone(),
                        itype: group.itype.clone(),
                        primary: string_field(value, "primary", "", &value_path)?,
                        secondary: string_field(value, "secondary", "", &value_path)?,
                        tertiary: string_field(value, "tertiary", "", &value_path)?,
                    },
                    deprecated: bool_field(value, "deprecated", false, &value_path)?,
                });
            }
        }
        for (group_index, group) in declaration.consumers.iter().enumerate() {
            for (value_index, value) in group.values.iter().enumerate() {
                let value_path = format!("{path}.consumers[{group_index}].values[{value_index}]");
                require_mapping(value, &value_path)?;
                consumer_records.push(ConsumerRecord {
                    sub_component: declaration.sub_component.clone(),
                    key: EndpointKey {
                        host: group.host.clone(),
                        itype: group.itype.clone(),
                        primary: string_field(value, "primary", "", &value_path)?,
                        secondary: string_field(value, "secondary", "", &value_path)?,
                        tertiary: string_field(value, "tertiary", "", &value_path)?,
                    },
                    optional: bool_field(value, "optional", false, &value_path)?,
                });
            }
        }
    }

    Ok((consumer_records, producer_records))
}

/// Validate one document against the declaration schema and deserialize it
/// into a typed [`Declaration`].
///
/// `serde_yaml`'s own deserialization already rejects most structural
/// mismatches (wrong types, missing `host`/`type`/`values` on a group); this
/// function additionally enforces the two checks `serde` cannot express —
/// `apiVersion` being exactly `1` and `kind` being exactly
/// `"InterfaceDeclaration"` — so that violations are reported the same way
/// regardless of which check caught them.
fn validate_declaration(raw: &serde_yaml::Value, path: &str) -> Result<Declaration, RegistryError> {
    let declaration: Declaration =
        serde_yaml::from_value(raw.clone()).map_err(|e| RegistryError::SchemaViolation {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    if declaration.api_version != SUPPORTED_API_VERSION {
        return Err(RegistryError::SchemaViolation {
            path: format!("{path}.apiVersion"),
            reason: format!(
                "expected exactly {SUPPORTED_API_VERSION}, got {}",
                declaration.api_version
            ),
        });
    }
    if declaration.kind != DECLARATION_KIND {
        return Err(RegistryError::SchemaViolation {
            path: format!("{path}.kind"),
            reason: format!("expected \"{DECLARATION_KIND}\", got \"{}\"", declaration.kind),
        });
    }

    Ok(declaration)
}
