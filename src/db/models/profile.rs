use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored profile. The id is opaque to callers; rules, events and
/// pause suggestions are all scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub device_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
