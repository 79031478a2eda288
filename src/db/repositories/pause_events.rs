use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{fmt_datetime, parse_datetime, to_u32},
    models::{PauseEvent, PauseReason, PauseType},
};

fn row_to_pause_event(row: &Row) -> Result<PauseEvent, rusqlite::Error> {
    let ts_str: String = row.get("ts")?;
    let pause_type: String = row.get("pause_type")?;
    let reason: String = row.get("reason")?;
    let pause_min: i64 = row.get("pause_min")?;

    let invalid = |e: anyhow::Error| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        )))
    };

    Ok(PauseEvent {
        id: Some(row.get("id")?),
        profile_id: row.get("profile_id")?,
        ts: parse_datetime(&ts_str, "ts").map_err(invalid)?,
        pause_type: match pause_type.as_str() {
            "SUGGESTED" => PauseType::Suggested,
            other => return Err(invalid(anyhow!("unknown pause type {other}"))),
        },
        reason: match reason.as_str() {
            "ACCEL_PATTERN" => PauseReason::AccelPattern,
            other => return Err(invalid(anyhow!("unknown pause reason {other}"))),
        },
        pause_min: to_u32(pause_min, "pause_min").map_err(invalid)?,
        message: row.get("message")?,
    })
}

/// Append one pause suggestion inside an open transaction. Pure append:
/// there is no uniqueness constraint and no recent-suggestion check.
pub(crate) fn insert(conn: &Connection, pause: &PauseEvent) -> Result<i64> {
    conn.execute(
        "INSERT INTO pause_events (profile_id, ts, pause_type, reason, pause_min, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            pause.profile_id,
            fmt_datetime(&pause.ts),
            pause.pause_type.as_str(),
            pause.reason.as_str(),
            pause.pause_min,
            pause.message,
        ],
    )
    .context("failed to insert pause event")?;

    Ok(conn.last_insert_rowid())
}

impl Database {
    pub async fn pause_events_for_profile(&self, profile_id: &str) -> Result<Vec<PauseEvent>> {
        let profile_id = profile_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, profile_id, ts, pause_type, reason, pause_min, message
                 FROM pause_events
                 WHERE profile_id = ?1
                 ORDER BY ts DESC, id DESC",
            )?;

            let pauses = stmt
                .query_map(params![profile_id], row_to_pause_event)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(pauses)
        })
        .await
    }
}
