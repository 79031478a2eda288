use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde_json::{from_str, to_string, Map, Value};

use crate::db::{
    connection::Database,
    helpers::{fmt_datetime, parse_datetime},
    models::{EventType, InteractionEvent},
};

fn row_to_event(row: &Row) -> Result<InteractionEvent, rusqlite::Error> {
    let ts_str: String = row.get("ts")?;
    let event_type: String = row.get("event_type")?;
    let payload_json: Option<String> = row.get("payload_json")?;

    let invalid = |e: anyhow::Error| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        )))
    };

    let payload: Map<String, Value> = match payload_json {
        Some(raw) => from_str(&raw)
            .context("failed to parse payload_json")
            .map_err(invalid)?,
        None => Map::new(),
    };

    Ok(InteractionEvent {
        id: Some(row.get("id")?),
        profile_id: row.get("profile_id")?,
        ts: parse_datetime(&ts_str, "ts").map_err(invalid)?,
        event_type: EventType::parse(&event_type),
        payload,
    })
}

/// Append one event inside an open transaction. Returns the rowid.
pub(crate) fn insert(conn: &Connection, event: &InteractionEvent) -> Result<i64> {
    let payload_json = if event.payload.is_empty() {
        None
    } else {
        Some(to_string(&event.payload).context("failed to serialize event payload")?)
    };

    conn.execute(
        "INSERT INTO interaction_events (profile_id, ts, event_type, payload_json)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            event.profile_id,
            fmt_datetime(&event.ts),
            event.event_type.as_str(),
            payload_json,
        ],
    )
    .context("failed to insert interaction event")?;

    Ok(conn.last_insert_rowid())
}

/// Count events of one type for a profile with `ts` in `[from, to]`,
/// both ends inclusive. Runs against the same transaction that wrote the
/// triggering event, so that event participates in its own count.
pub(crate) fn count_in_window(
    conn: &Connection,
    profile_id: &str,
    event_type: &EventType,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM interaction_events
         WHERE profile_id = ?1 AND event_type = ?2 AND ts >= ?3 AND ts <= ?4",
        params![
            profile_id,
            event_type.as_str(),
            fmt_datetime(&from),
            fmt_datetime(&to),
        ],
        |row| row.get(0),
    )?;

    Ok(count)
}

impl Database {
    /// Events for a profile in a closed timestamp range, oldest first,
    /// optionally narrowed to one event type.
    pub async fn events_in_range(
        &self,
        profile_id: &str,
        event_type: Option<EventType>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<InteractionEvent>> {
        let profile_id = profile_id.to_string();
        self.execute(move |conn| {
            let from = fmt_datetime(&from);
            let to = fmt_datetime(&to);

            let events = match event_type {
                Some(event_type) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, profile_id, ts, event_type, payload_json
                         FROM interaction_events
                         WHERE profile_id = ?1 AND event_type = ?2 AND ts >= ?3 AND ts <= ?4
                         ORDER BY ts ASC",
                    )?;
                    let events = stmt.query_map(
                        params![profile_id, event_type.as_str(), from, to],
                        row_to_event,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                    events
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, profile_id, ts, event_type, payload_json
                         FROM interaction_events
                         WHERE profile_id = ?1 AND ts >= ?2 AND ts <= ?3
                         ORDER BY ts ASC",
                    )?;
                    let events = stmt
                        .query_map(params![profile_id, from, to], row_to_event)?
                        .collect::<Result<Vec<_>, _>>()?;
                    events
                }
            };

            Ok(events)
        })
        .await
    }

    pub async fn count_events_for_profile(&self, profile_id: &str) -> Result<i64> {
        let profile_id = profile_id.to_string();
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM interaction_events WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }
}
