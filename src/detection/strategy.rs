use anyhow::Result;
use chrono::Duration;
use rusqlite::Transaction;
use serde_json::{Map, Value};

use crate::db::{
    models::{EventType, InteractionEvent, PauseReason, RuleSet},
    repositories::events,
};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

const BURST_MESSAGE: &str = "Accelerated use detected: rapid taps. Take a short break.";
const RATE_MESSAGE: &str =
    "Accelerated use detected: constant screen switching. Take a short break.";

/// Result of a strategy deciding that a threshold was met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub reason: PauseReason,
    pub pause_min: u32,
    pub message: &'static str,
}

/// One way of deciding whether a just-stored event completes an accelerated
/// use pattern. Strategies run inside the ingestion transaction, so any
/// store reads see the triggering event as already written.
pub trait DetectionStrategy: Send + Sync {
    fn applies_to(&self, event_type: &EventType) -> bool;

    fn evaluate(
        &self,
        tx: &Transaction<'_>,
        rules: &RuleSet,
        event: &InteractionEvent,
    ) -> Result<Option<Crossing>>;
}

/// Forgiving numeric read from an event payload. Missing keys and
/// non-numeric values both yield `None`; a malformed payload degrades
/// detection instead of failing the request.
fn payload_i64(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = payload.get(key)?;
    let numeric = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64));

    if numeric.is_none() {
        log_warn!("ignoring non-numeric payload field '{key}': {value}");
    }

    numeric
}

/// Strategy A: trust the client's self-reported burst summary. The device
/// already counted its taps; we only compare the summary against the rules.
pub struct ClientReportedBurst;

impl DetectionStrategy for ClientReportedBurst {
    fn applies_to(&self, event_type: &EventType) -> bool {
        *event_type == EventType::TapBurst
    }

    fn evaluate(
        &self,
        _tx: &Transaction<'_>,
        rules: &RuleSet,
        event: &InteractionEvent,
    ) -> Result<Option<Crossing>> {
        let count = payload_i64(&event.payload, "count").unwrap_or(0);
        let window_sec = payload_i64(&event.payload, "window_sec").unwrap_or(i64::MAX);

        let crossed = window_sec <= i64::from(rules.taps_window_sec)
            && count >= i64::from(rules.taps_threshold);

        Ok(crossed.then(|| Crossing {
            reason: PauseReason::AccelPattern,
            pause_min: rules.suggested_pause_min,
            message: BURST_MESSAGE,
        }))
    }
}

/// Strategy B: recount screen changes server-side over the configured
/// window ending at the event's own timestamp, both ends inclusive.
pub struct ServerCountedWindow;

impl DetectionStrategy for ServerCountedWindow {
    fn applies_to(&self, event_type: &EventType) -> bool {
        *event_type == EventType::ScreenChange
    }

    fn evaluate(
        &self,
        tx: &Transaction<'_>,
        rules: &RuleSet,
        event: &InteractionEvent,
    ) -> Result<Option<Crossing>> {
        let window_start =
            event.ts - Duration::seconds(i64::from(rules.screen_changes_window_sec));

        let changes = events::count_in_window(
            tx,
            &event.profile_id,
            &EventType::ScreenChange,
            window_start,
            event.ts,
        )?;

        let crossed = changes >= i64::from(rules.screen_changes_threshold);

        Ok(crossed.then(|| Crossing {
            reason: PauseReason::AccelPattern,
            pause_min: rules.suggested_pause_min,
            message: RATE_MESSAGE,
        }))
    }
}
