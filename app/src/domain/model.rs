//! The row shapes and endpoint-key identity shared by every other module in
//! [`crate::domain`].

/// The 5-tuple that identifies an interface endpoint fleet-wide, independent
/// of who produces or consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct EndpointKey {
    pub host: String,
    #[serde(rename = "type")]
    pub itype: String,
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl std::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" \"{}\" \"{}\" \"{}\" \"{}\"",
            self.host, self.itype, self.primary, self.secondary, self.tertiary
        )
    }
}

/// A declared dependency on an interface endpoint.
///
/// `optional = false` means the owning component cannot function unless some
/// producer exists for `key`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerRecord {
    pub sub_component: String,
    #[serde(flatten)]
    pub key: EndpointKey,
    pub optional: bool,
}

/// A declared implementation of an interface endpoint.
///
/// `deprecated` is informational only; it plays no part in invariant
/// checking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerRecord {
    pub sub_component: String,
    #[serde(flatten)]
    pub key: EndpointKey,
    pub deprecated: bool,
}

impl ConsumerRecord {
    /// The 6-tuple used by the Sync Protocol's preflight uniqueness check —
    /// everything but `optional`.
    fn dedup_key(&self) -> (&str, &EndpointKey) {
        (&self.sub_component, &self.key)
    }
}

impl ProducerRecord {
    /// The 6-tuple used by the Sync Protocol's preflight uniqueness check —
    /// everything but `deprecated`.
    fn dedup_key(&self) -> (&str, &EndpointKey) {
        (&self.sub_component, &self.key)
    }
}

/// Find the first record sharing its 6-tuple dedup key with an earlier one,
/// returning that shared key for the error message.
pub(crate) fn first_consumer_duplicate(records: &[ConsumerRecord]) -> Option<&EndpointKey> {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if !seen.insert(record.dedup_key()) {
            return Some(&record.key);
        }
    }
    None
}

pub(crate) fn first_producer_duplicate(records: &[ProducerRecord]) -> Option<&EndpointKey> {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if !seen.insert(record.dedup_key()) {
            return Some(&record.key);
        }
    }
    None
}

/// All declared interfaces for one component, as returned by
/// [`crate::domain::aggregator::get_components`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct Component {
    pub name: String,
    pub consumers: Vec<ConsumerRecord>,
    pub producers: Vec<ProducerRecord>,
}
