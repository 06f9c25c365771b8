//! The error taxonomy shared by the parser, the sync protocol and the HTTP
//! adapter. A single enum keeps the status-code mapping in one place.

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The submitted document could not be deserialized at all.
    #[error("the submitted document is not valid YAML: {0}")]
    MalformedDocument(String),

    /// The document deserialized but didn't conform to the declaration
    /// schema.
    #[error("declaration at `{path}` is invalid: {reason}")]
    SchemaViolation { path: String, reason: String },

    /// Two consumer records in the same submission share their 6-tuple
    /// dedup key.
    #[error("consumer entry specified multiple times for endpoint {0}")]
    DuplicateConsumerEntry(String),

    /// Two producer records in the same submission share their 6-tuple
    /// dedup key.
    #[error("producer entry specified multiple times for endpoint {0}")]
    DuplicateProducerEntry(String),

    /// The store rejected the write with a unique-constraint violation.
    /// Should be unreachable once the preflight checks above have run, but
    /// the store's answer is authoritative.
    #[error("the interface specification contains one value multiple times: {0}")]
    InterfaceEntryDuplication(String),

    /// A referential trigger (T1 or T2) aborted the transaction.
    #[error("referential conflict: {0}")]
    InterfaceEntryConflict(String),

    /// Any other store failure: connection loss, pool exhaustion, and so
    /// on. Logged in full server-side; reported to the client without
    /// detail.
    #[error("the registry store is unavailable")]
    StoreUnavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RegistryError {
    fn from(e: sqlx::Error) -> Self {
        // Postgres reports trigger aborts (`RAISE EXCEPTION`) as SQLSTATE
        // P0001 and unique-constraint violations as 23505. Every other
        // database error is an infrastructure failure from this crate's
        // point of view.
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.code().as_deref() {
                Some("P0001") => {
                    return RegistryError::InterfaceEntryConflict(db_err.message().to_string());
                }
                Some("23505") => {
                    return RegistryError::InterfaceEntryDuplication(db_err.message().to_string());
                }
                _ => {}
            }
        }
        RegistryError::StoreUnavailable(e)
    }
}
