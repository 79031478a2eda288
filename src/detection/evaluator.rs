use anyhow::Result;
use rusqlite::Transaction;

use crate::db::models::{InteractionEvent, RuleSet};

use super::strategy::{ClientReportedBurst, Crossing, DetectionStrategy, ServerCountedWindow};

/// Dispatches a newly-stored event to the first strategy that claims its
/// type. Adding a detection strategy means registering it here; the control
/// flow never switches on event type itself.
pub struct WindowEvaluator {
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl Default for WindowEvaluator {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(ClientReportedBurst), Box::new(ServerCountedWindow)],
        }
    }
}

impl WindowEvaluator {
    pub fn with_strategies(strategies: Vec<Box<dyn DetectionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Runs inside the ingestion transaction, after the event row is
    /// written. Acceleration detection disabled means no strategy runs;
    /// an event type no strategy claims is a no-op, not an error.
    pub fn evaluate(
        &self,
        tx: &Transaction<'_>,
        rules: &RuleSet,
        event: &InteractionEvent,
    ) -> Result<Option<Crossing>> {
        if !rules.accel_enabled {
            return Ok(None);
        }

        for strategy in &self.strategies {
            if strategy.applies_to(&event.event_type) {
                return strategy.evaluate(tx, rules, event);
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rusqlite::Connection;
    use serde_json::{json, Map};

    use crate::db::{migrations::run_migrations, models::EventType};

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("in-memory db");
        run_migrations(&mut conn).expect("migrations");
        conn.execute(
            "INSERT INTO profiles (id, display_name, device_id, created_at)
             VALUES ('prof_a', 'Test Child', NULL, '2024-03-01T00:00:00.000Z')",
            [],
        )
        .unwrap();
        conn
    }

    fn event_of(event_type: EventType) -> InteractionEvent {
        InteractionEvent {
            id: None,
            profile_id: "prof_a".to_string(),
            ts: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            event_type,
            payload: json!({ "count": 100, "window_sec": 1 })
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    #[test]
    fn accel_disabled_short_circuits_all_strategies() {
        let mut conn = test_conn();
        let tx = conn.transaction().unwrap();
        let rules = RuleSet {
            accel_enabled: false,
            ..RuleSet::default()
        };

        // Payload that would trivially cross if evaluated.
        let result = WindowEvaluator::default()
            .evaluate(&tx, &rules, &event_of(EventType::TapBurst))
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn unclaimed_event_type_is_a_no_op() {
        let mut conn = test_conn();
        let tx = conn.transaction().unwrap();
        let rules = RuleSet::default();

        let mut event = event_of(EventType::Other("SCROLL_STORM".to_string()));
        event.payload = Map::new();

        let result = WindowEvaluator::default()
            .evaluate(&tx, &rules, &event)
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn tap_burst_routes_to_client_reported_strategy() {
        let mut conn = test_conn();
        let tx = conn.transaction().unwrap();
        let rules = RuleSet::default();

        let result = WindowEvaluator::default()
            .evaluate(&tx, &rules, &event_of(EventType::TapBurst))
            .unwrap();
        assert!(result.is_some());
    }
}
