//! Bounded, crash-tolerant persisted logs.
//!
//! A log is a single JSON document holding an ordered record array and a
//! schema version:
//!
//! ```json
//! { "<collection>": [ ... ], "version": "1.0" }
//! ```
//!
//! Unknown top-level fields are ignored on read and a missing collection or
//! version falls back to its default.

mod store;

pub use store::TelemetryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MementoError, MementoResult};

/// Schema version written to every log document.
pub const SCHEMA_VERSION: &str = "1.0";

/// A record type that can be stored in a telemetry log.
pub trait LogRecord: Serialize + DeserializeOwned {
    /// Key of the record array in the persisted document.
    const COLLECTION: &'static str;
}

/// Ordered records plus the schema version they were written with.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryLog<T> {
    pub records: Vec<T>,
    pub version: String,
}

impl<T> Default for TelemetryLog<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> TelemetryLog<T> {
    /// An empty log tagged with the current schema version.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            version: SCHEMA_VERSION.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop the oldest records until at most `cap` remain.
    ///
    /// Returns the number of records evicted.
    pub fn trim_to(&mut self, cap: usize) -> usize {
        let excess = self.records.len().saturating_sub(cap);
        self.records.drain(..excess);
        excess
    }
}

impl<T: LogRecord> TelemetryLog<T> {
    /// Build the persisted JSON document.
    pub fn to_document(&self) -> MementoResult<Value> {
        let mut doc = Map::new();
        doc.insert(T::COLLECTION.to_string(), serde_json::to_value(&self.records)?);
        doc.insert("version".to_string(), Value::String(self.version.clone()));
        Ok(Value::Object(doc))
    }

    /// Parse a persisted JSON document.
    pub fn from_document(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut doc) = value else {
            return Err(serde::de::Error::custom(format!(
                "expected a JSON object with a '{}' array",
                T::COLLECTION
            )));
        };

        let records = match doc.remove(T::COLLECTION) {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value(raw)?,
        };

        let version = doc
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(SCHEMA_VERSION)
            .to_string();

        Ok(Self { records, version })
    }
}

/// Result of loading a log from disk.
///
/// Corrupt or unreadable logs are never fatal: they load as an empty log and
/// the cause is kept so callers can observe that recovery happened.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Loaded(TelemetryLog<T>),
    Recovered {
        log: TelemetryLog<T>,
        cause: MementoError,
    },
}

impl<T> LoadOutcome<T> {
    pub fn log(&self) -> &TelemetryLog<T> {
        match self {
            LoadOutcome::Loaded(log) => log,
            LoadOutcome::Recovered { log, .. } => log,
        }
    }

    pub fn into_log(self) -> TelemetryLog<T> {
        match self {
            LoadOutcome::Loaded(log) => log,
            LoadOutcome::Recovered { log, .. } => log,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }

    /// Why the log had to be reset, if it was.
    pub fn cause(&self) -> Option<&MementoError> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Recovered { cause, .. } => Some(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        n: u32,
    }

    impl LogRecord for Note {
        const COLLECTION: &'static str = "notes";
    }

    #[test]
    fn test_trim_keeps_newest() {
        let mut log = TelemetryLog {
            records: (0..10).map(|n| Note { n }).collect(),
            version: SCHEMA_VERSION.to_string(),
        };
        assert_eq!(log.trim_to(4), 6);
        let kept: Vec<u32> = log.records.iter().map(|r| r.n).collect();
        assert_eq!(kept, vec![6, 7, 8, 9]);
        assert_eq!(log.trim_to(4), 0);
    }

    #[test]
    fn test_document_shape() {
        let log = TelemetryLog {
            records: vec![Note { n: 1 }],
            version: SCHEMA_VERSION.to_string(),
        };
        assert_eq!(
            log.to_document().unwrap(),
            json!({ "notes": [{ "n": 1 }], "version": "1.0" })
        );
    }

    #[test]
    fn test_forward_compatible_parse() {
        let doc = json!({ "notes": [{ "n": 3, "extra": true }], "owner": "someone" });
        let log = TelemetryLog::<Note>::from_document(doc).unwrap();
        assert_eq!(log.records, vec![Note { n: 3 }]);
        assert_eq!(log.version, "1.0");

        let log = TelemetryLog::<Note>::from_document(json!({ "version": "0.9" })).unwrap();
        assert!(log.is_empty());
        assert_eq!(log.version, "0.9");
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(TelemetryLog::<Note>::from_document(json!([1, 2, 3])).is_err());
        assert!(TelemetryLog::<Note>::from_document(json!({ "notes": "nope" })).is_err());
    }
}
