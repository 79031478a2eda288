use anyhow::Result;
use chrono::Utc;
use rusqlite::Transaction;

use crate::db::{
    models::{Decision, PauseEvent, PauseType},
    repositories::pause_events,
};

use super::strategy::Crossing;

/// Turns a crossing into a persisted pause suggestion plus the decision
/// payload handed back to the caller. Append-only by design: every
/// qualifying event re-fires, there is no suppression window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionEmitter;

impl SuggestionEmitter {
    pub fn emit(
        &self,
        tx: &Transaction<'_>,
        profile_id: &str,
        crossing: Crossing,
    ) -> Result<Decision> {
        let pause = PauseEvent {
            id: None,
            profile_id: profile_id.to_string(),
            ts: Utc::now(),
            pause_type: PauseType::Suggested,
            reason: crossing.reason,
            pause_min: crossing.pause_min,
            message: crossing.message.to_string(),
        };

        pause_events::insert(tx, &pause)?;

        Ok(Decision::SuggestedPause {
            reason: crossing.reason,
            pause_min: crossing.pause_min,
            message: crossing.message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rusqlite::Connection;

    use crate::db::{migrations::run_migrations, models::PauseReason};

    #[test]
    fn emit_persists_one_row_and_returns_the_decision() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO profiles (id, display_name, device_id, created_at)
             VALUES ('prof_a', 'Test Child', NULL, '2024-03-01T00:00:00.000Z')",
            [],
        )
        .unwrap();

        let tx = conn.transaction().unwrap();
        let decision = SuggestionEmitter
            .emit(
                &tx,
                "prof_a",
                Crossing {
                    reason: PauseReason::AccelPattern,
                    pause_min: 5,
                    message: "take a break",
                },
            )
            .unwrap();
        tx.commit().unwrap();

        assert_eq!(
            decision,
            Decision::SuggestedPause {
                reason: PauseReason::AccelPattern,
                pause_min: 5,
                message: "take a break".to_string(),
            }
        );

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM pause_events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
