use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the aggregate an event stream (and its read model) belongs to.
///
/// Write-side aggregates choose their own identifiers, so this is an opaque
/// string rather than a UUID. [`AggregateId::new`] still mints random
/// identifiers for callers that need one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AggregateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AggregateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

impl AsRef<str> for AggregateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Version of a read model.
///
/// Starts at 0 for a model that has never had an event applied and
/// increments by 1 on every applied event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) of a model nothing was applied to.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_new_creates_unique_ids() {
        let id1 = AggregateId::new();
        let id2 = AggregateId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn aggregate_id_from_str_preserves_value() {
        let id = AggregateId::from("o1");
        assert_eq!(id.as_str(), "o1");
        assert_eq!(id.to_string(), "o1");
    }

    #[test]
    fn aggregate_id_serializes_as_plain_string() {
        let id = AggregateId::from("user-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user-42\"");
        let deserialized: AggregateId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn aggregate_ids_order_lexicographically() {
        let mut ids = vec![AggregateId::from("o3"), AggregateId::from("o1"), AggregateId::from("o2")];
        ids.sort();
        let raw: Vec<_> = ids.iter().map(AggregateId::as_str).collect();
        assert_eq!(raw, ["o1", "o2", "o3"]);
    }

    #[test]
    fn version_starts_at_zero_and_increments() {
        assert_eq!(Version::initial().as_i64(), 0);
        assert_eq!(Version::initial().next(), Version::new(1));
        assert!(Version::new(1) < Version::new(2));
    }
}
