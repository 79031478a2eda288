use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::{
    connection::Database,
    models::{Decision, EventType, InteractionEvent},
    repositories::{events, profiles, rule_sets},
};
use crate::detection::{SuggestionEmitter, WindowEvaluator};
use crate::error::EngineError;
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Incoming event as the transport hands it over: timestamps still raw
/// strings, event types not yet resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub profile_id: String,
    pub timestamp: String,
    pub event_type: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// ISO-8601 with a tolerance the devices rely on: an offset-less timestamp
/// is taken as UTC, and both `T` and space separators are accepted.
pub fn parse_event_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

enum SubmitOutcome {
    ProfileMissing,
    BadTimestamp,
    Decided(Decision),
}

/// Entry point for interaction events. Validates the envelope, persists the
/// event and runs detection, all inside one database transaction: the window
/// count either sees the whole of a concurrent submission or none of it.
pub struct IngestionGateway {
    db: Database,
    evaluator: Arc<WindowEvaluator>,
    emitter: SuggestionEmitter,
}

impl IngestionGateway {
    pub fn new(db: Database) -> Self {
        Self::with_evaluator(db, WindowEvaluator::default())
    }

    pub fn with_evaluator(db: Database, evaluator: WindowEvaluator) -> Self {
        Self {
            db,
            evaluator: Arc::new(evaluator),
            emitter: SuggestionEmitter,
        }
    }

    /// Submit one interaction event and get the pause decision back.
    ///
    /// The event row is written even when rules are absent or disabled (the
    /// raw signal is kept for later analysis); only validation failures leave
    /// the store untouched. Exactly one event row per `Ok` return.
    pub async fn submit_event(&self, envelope: EventEnvelope) -> Result<Decision, EngineError> {
        let profile_id = envelope.profile_id.clone();
        let raw_timestamp = envelope.timestamp.clone();
        let evaluator = Arc::clone(&self.evaluator);
        let emitter = self.emitter;

        let outcome = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;

                if !profiles::exists(&tx, &envelope.profile_id)? {
                    return Ok(SubmitOutcome::ProfileMissing);
                }

                let ts = match parse_event_timestamp(&envelope.timestamp) {
                    Some(ts) => ts,
                    None => return Ok(SubmitOutcome::BadTimestamp),
                };

                let mut event = InteractionEvent {
                    id: None,
                    profile_id: envelope.profile_id.clone(),
                    ts,
                    event_type: EventType::parse(&envelope.event_type),
                    payload: envelope.payload,
                };
                event.id = Some(events::insert(&tx, &event)?);

                let decision = match rule_sets::get(&tx, &event.profile_id)? {
                    Some(rules) if rules.enabled => {
                        match evaluator.evaluate(&tx, &rules, &event)? {
                            Some(crossing) => emitter.emit(&tx, &event.profile_id, crossing)?,
                            None => Decision::None,
                        }
                    }
                    // Absent or disabled rules: the event is still kept.
                    _ => Decision::None,
                };

                tx.commit()?;
                Ok(SubmitOutcome::Decided(decision))
            })
            .await?;

        match outcome {
            SubmitOutcome::ProfileMissing => Err(EngineError::ProfileNotFound(profile_id)),
            SubmitOutcome::BadTimestamp => Err(EngineError::InvalidTimestamp(raw_timestamp)),
            SubmitOutcome::Decided(decision) => {
                if let Decision::SuggestedPause { pause_min, .. } = &decision {
                    log_info!("suggested {pause_min}min pause for profile {profile_id}");
                }
                Ok(decision)
            }
        }
    }
}
