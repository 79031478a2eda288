use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{fmt_datetime, parse_datetime},
    models::{Profile, RuleSet},
    repositories::rule_sets,
};

fn row_to_profile(row: &Row) -> Result<Profile, rusqlite::Error> {
    let created_at_str: String = row.get("created_at")?;

    Ok(Profile {
        id: row.get("id")?,
        display_name: row.get("display_name")?,
        device_id: row.get("device_id")?,
        created_at: parse_datetime(&created_at_str, "created_at").map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )))
        })?,
    })
}

/// Existence check used inside the ingestion transaction.
pub(crate) fn exists(conn: &Connection, profile_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM profiles WHERE id = ?1",
            params![profile_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(found.is_some())
}

impl Database {
    /// Create a profile together with its default rule set, atomically.
    /// Everything else in the engine treats the profile's existence as a
    /// precondition, so the two rows are never observable separately.
    pub async fn provision_profile(
        &self,
        display_name: String,
        device_id: Option<String>,
    ) -> Result<Profile> {
        let profile = Profile {
            id: format!("prof_{}", Uuid::new_v4()),
            display_name,
            device_id,
            created_at: Utc::now(),
        };

        let record = profile.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO profiles (id, display_name, device_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    record.display_name,
                    record.device_id,
                    fmt_datetime(&record.created_at),
                ],
            )?;

            rule_sets::insert(&tx, &record.id, &RuleSet::default())?;

            tx.commit()?;
            Ok(())
        })
        .await?;

        Ok(profile)
    }

    pub async fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>> {
        let profile_id = profile_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, device_id, created_at
                 FROM profiles
                 WHERE id = ?1",
            )?;

            let result = stmt.query_row(params![profile_id], row_to_profile).optional()?;

            Ok(result)
        })
        .await
    }
}
