use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Interaction event kinds the detector knows about. Anything else is
/// stored verbatim and ignored by detection, so newer clients can ship
/// new signal types ahead of the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    #[serde(rename = "TAP_BURST")]
    TapBurst,
    #[serde(rename = "SCREEN_CHANGE")]
    ScreenChange,
    #[serde(untagged)]
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::TapBurst => "TAP_BURST",
            EventType::ScreenChange => "SCREEN_CHANGE",
            EventType::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "TAP_BURST" => EventType::TapBurst,
            "SCREEN_CHANGE" => EventType::ScreenChange,
            other => EventType::Other(other.to_string()),
        }
    }
}

/// One raw interaction signal, immutable once written. `ts` is event-time
/// reported by the device, not ingestion time; out-of-order arrival is
/// expected and handled by querying on `ts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub id: Option<i64>,
    pub profile_id: String,
    pub ts: DateTime<Utc>,
    pub event_type: EventType,
    pub payload: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_types_round_trip() {
        assert_eq!(EventType::parse("TAP_BURST"), EventType::TapBurst);
        assert_eq!(EventType::parse("SCREEN_CHANGE"), EventType::ScreenChange);
        assert_eq!(EventType::TapBurst.as_str(), "TAP_BURST");
    }

    #[test]
    fn unknown_types_are_preserved() {
        let parsed = EventType::parse("SCROLL_STORM");
        assert_eq!(parsed, EventType::Other("SCROLL_STORM".to_string()));
        assert_eq!(parsed.as_str(), "SCROLL_STORM");
    }
}
