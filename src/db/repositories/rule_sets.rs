use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{fmt_datetime, parse_datetime},
    models::RuleSet,
    repositories::profiles,
};
use crate::error::EngineError;

fn row_to_rule_set(row: &Row) -> Result<RuleSet, rusqlite::Error> {
    let updated_at_str: String = row.get("updated_at")?;

    Ok(RuleSet {
        enabled: row.get("enabled")?,
        continuous_use_limit_min: row.get("continuous_use_limit_min")?,
        forced_break_min: row.get("forced_break_min")?,
        accel_enabled: row.get("accel_enabled")?,
        taps_window_sec: row.get("taps_window_sec")?,
        taps_threshold: row.get("taps_threshold")?,
        screen_changes_window_sec: row.get("screen_changes_window_sec")?,
        screen_changes_threshold: row.get("screen_changes_threshold")?,
        suggested_pause_min: row.get("suggested_pause_min")?,
        updated_at: parse_datetime(&updated_at_str, "updated_at").map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )))
        })?,
    })
}

/// Read a profile's live rule set inside an open transaction.
pub(crate) fn get(conn: &Connection, profile_id: &str) -> Result<Option<RuleSet>> {
    let mut stmt = conn.prepare(
        "SELECT enabled, continuous_use_limit_min, forced_break_min, accel_enabled,
                taps_window_sec, taps_threshold,
                screen_changes_window_sec, screen_changes_threshold,
                suggested_pause_min, updated_at
         FROM rule_sets
         WHERE profile_id = ?1",
    )?;

    let result = stmt.query_row(params![profile_id], row_to_rule_set).optional()?;

    Ok(result)
}

pub(crate) fn insert(conn: &Connection, profile_id: &str, rules: &RuleSet) -> Result<()> {
    conn.execute(
        "INSERT INTO rule_sets (
            profile_id, enabled, continuous_use_limit_min, forced_break_min,
            accel_enabled, taps_window_sec, taps_threshold,
            screen_changes_window_sec, screen_changes_threshold,
            suggested_pause_min, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            profile_id,
            rules.enabled,
            rules.continuous_use_limit_min,
            rules.forced_break_min,
            rules.accel_enabled,
            rules.taps_window_sec,
            rules.taps_threshold,
            rules.screen_changes_window_sec,
            rules.screen_changes_threshold,
            rules.suggested_pause_min,
            fmt_datetime(&rules.updated_at),
        ],
    )?;

    Ok(())
}

impl Database {
    pub async fn get_rule_set(&self, profile_id: &str) -> Result<Option<RuleSet>> {
        let profile_id = profile_id.to_string();
        self.execute(move |conn| get(conn, &profile_id)).await
    }

    /// Insert or replace a profile's rule set. `updated_at` is refreshed on
    /// every call; the positivity invariant is enforced before any write.
    pub async fn upsert_rule_set(
        &self,
        profile_id: &str,
        mut rules: RuleSet,
    ) -> Result<RuleSet, EngineError> {
        if let Err(reason) = rules.validate() {
            return Err(EngineError::InvalidRuleSet(reason));
        }

        rules.updated_at = Utc::now();

        let profile_id = profile_id.to_string();
        let id_for_task = profile_id.clone();
        let record = rules.clone();

        let stored = self
            .execute(move |conn| {
                let tx = conn.transaction()?;

                if !profiles::exists(&tx, &id_for_task)? {
                    return Ok(None);
                }

                tx.execute(
                    "INSERT INTO rule_sets (
                        profile_id, enabled, continuous_use_limit_min, forced_break_min,
                        accel_enabled, taps_window_sec, taps_threshold,
                        screen_changes_window_sec, screen_changes_threshold,
                        suggested_pause_min, updated_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                     ON CONFLICT(profile_id) DO UPDATE SET
                        enabled = excluded.enabled,
                        continuous_use_limit_min = excluded.continuous_use_limit_min,
                        forced_break_min = excluded.forced_break_min,
                        accel_enabled = excluded.accel_enabled,
                        taps_window_sec = excluded.taps_window_sec,
                        taps_threshold = excluded.taps_threshold,
                        screen_changes_window_sec = excluded.screen_changes_window_sec,
                        screen_changes_threshold = excluded.screen_changes_threshold,
                        suggested_pause_min = excluded.suggested_pause_min,
                        updated_at = excluded.updated_at",
                    params![
                        id_for_task,
                        record.enabled,
                        record.continuous_use_limit_min,
                        record.forced_break_min,
                        record.accel_enabled,
                        record.taps_window_sec,
                        record.taps_threshold,
                        record.screen_changes_window_sec,
                        record.screen_changes_threshold,
                        record.suggested_pause_min,
                        fmt_datetime(&record.updated_at),
                    ],
                )?;

                tx.commit()?;
                Ok(Some(record))
            })
            .await?;

        stored.ok_or(EngineError::ProfileNotFound(profile_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_db() -> Database {
        let path = std::env::temp_dir().join(format!(
            "pacewatch-test-{}.sqlite3",
            uuid::Uuid::new_v4()
        ));
        Database::new(path).expect("test database")
    }

    #[tokio::test]
    async fn upsert_replaces_the_live_row_and_refreshes_updated_at() {
        let db = test_db();
        let profile = db
            .provision_profile("Test Child".to_string(), None)
            .await
            .unwrap();

        let provisioned = db.get_rule_set(&profile.id).await.unwrap().unwrap();

        let updated = RuleSet {
            taps_threshold: 40,
            screen_changes_window_sec: 120,
            ..RuleSet::default()
        };
        let stored = db.upsert_rule_set(&profile.id, updated).await.unwrap();
        assert!(stored.updated_at >= provisioned.updated_at);

        let fetched = db.get_rule_set(&profile.id).await.unwrap().unwrap();
        assert_eq!(fetched.taps_threshold, 40);
        assert_eq!(fetched.screen_changes_window_sec, 120);

        // Still exactly one live row.
        let rows: i64 = db
            .execute(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM rule_sets", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn upsert_rejects_non_positive_fields() {
        let db = test_db();
        let profile = db
            .provision_profile("Test Child".to_string(), None)
            .await
            .unwrap();

        let rules = RuleSet {
            suggested_pause_min: 0,
            ..RuleSet::default()
        };
        let result = db.upsert_rule_set(&profile.id, rules).await;
        assert!(matches!(result, Err(EngineError::InvalidRuleSet(_))));
    }

    #[tokio::test]
    async fn upsert_for_unknown_profile_is_rejected() {
        let db = test_db();
        let result = db.upsert_rule_set("prof_missing", RuleSet::default()).await;
        assert!(matches!(result, Err(EngineError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn missing_rule_set_reads_as_none() {
        let db = test_db();
        assert_eq!(db.get_rule_set("prof_missing").await.unwrap(), None);
    }
}
