use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PauseType {
    #[serde(rename = "SUGGESTED")]
    Suggested,
}

impl PauseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseType::Suggested => "SUGGESTED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PauseReason {
    #[serde(rename = "ACCEL_PATTERN")]
    AccelPattern,
}

impl PauseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseReason::AccelPattern => "ACCEL_PATTERN",
        }
    }
}

/// A persisted pause suggestion. Written only as the side effect of a
/// detected crossing; never updated. `ts` is creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PauseEvent {
    pub id: Option<i64>,
    pub profile_id: String,
    pub ts: DateTime<Utc>,
    pub pause_type: PauseType,
    pub reason: PauseReason,
    pub pause_min: u32,
    pub message: String,
}

/// Outcome of one event submission, shaped for the transport layer:
/// `{"action": "NONE"}` or
/// `{"action": "SUGGESTED_PAUSE", "reason": ..., "pauseMin": ..., "message": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all_fields = "camelCase")]
pub enum Decision {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "SUGGESTED_PAUSE")]
    SuggestedPause {
        reason: PauseReason,
        pause_min: u32,
        message: String,
    },
}
