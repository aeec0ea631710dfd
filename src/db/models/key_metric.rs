use serde::{Deserialize, Serialize};

/// Named string metric (PostgreSQL `key_metrics`).
///
/// Primary Key: key
/// The only table this service writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub key: String,
    pub value: String,
}

impl KeyMetric {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
