use rusqlite::{params, Connection, OptionalExtension};

use crate::date_util::parse_timestamp;
use crate::error::Error;
use crate::schema::{Report, ReportData};

// ── Reports ────────────────────────────────────────────────────────

/// A `reports` row before the document is parsed.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub id: String,
    pub document: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ReportRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            document: row.get(1)?,
            status: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    pub fn data(&self) -> Result<ReportData, Error> {
        Ok(serde_json::from_str(&self.document)?)
    }

    pub fn into_report(self) -> Result<Report, Error> {
        let data = self.data()?;
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| Error::Database(format!("bad created_at on report {}", self.id)))?;
        let updated_at = parse_timestamp(&self.updated_at)
            .ok_or_else(|| Error::Database(format!("bad updated_at on report {}", self.id)))?;
        Ok(Report {
            id: self.id,
            data,
            created_at,
            updated_at,
        })
    }
}

pub fn insert_report(
    conn: &Connection,
    id: &str,
    data: &ReportData,
    timestamp: &str,
) -> Result<(), Error> {
    let document = serde_json::to_string(data)?;
    conn.execute(
        "INSERT INTO reports (id, document, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![id, document, data.status.as_str(), timestamp],
    )?;
    Ok(())
}

pub fn get_report_row(conn: &Connection, id: &str) -> Result<Option<ReportRow>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, document, status, created_at, updated_at FROM reports WHERE id = ?1",
        params![id],
        ReportRow::from_row,
    )
    .optional()
}

/// Overwrite a report's document. Returns false when no row has `id`.
pub fn replace_report(
    conn: &Connection,
    id: &str,
    data: &ReportData,
    updated_at: &str,
) -> Result<bool, Error> {
    let document = serde_json::to_string(data)?;
    let count = conn.execute(
        "UPDATE reports SET document = ?2, status = ?3, updated_at = ?4 WHERE id = ?1",
        params![id, document, data.status.as_str(), updated_at],
    )?;
    Ok(count > 0)
}

pub fn delete_report(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
    let count = conn.execute("DELETE FROM reports WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

/// All reports, newest first. Insertion order breaks timestamp ties.
pub fn list_report_rows(conn: &Connection) -> Result<Vec<ReportRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, document, status, created_at, updated_at
         FROM reports ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([], ReportRow::from_row)?;
    rows.collect()
}

// ── Config ─────────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        params![key, value],
    )?;
    Ok(())
}

pub fn unset_config(conn: &Connection, key: &str) -> Result<bool, rusqlite::Error> {
    let count = conn.execute("DELETE FROM app_config WHERE key = ?1", params![key])?;
    Ok(count > 0)
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ReportStatus;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_config_round_trip() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                set_config(conn, "max_photos_per_entry", "6")?;
                let val = get_config(conn, "max_photos_per_entry")?;
                assert_eq!(val, Some("6".to_string()));

                let missing = get_config(conn, "nonexistent")?;
                assert_eq!(missing, None);

                assert!(unset_config(conn, "max_photos_per_entry")?);
                assert!(!unset_config(conn, "max_photos_per_entry")?);
                assert!(list_config(conn)?.is_empty());
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_report_row_round_trip() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                let mut data = ReportData::default();
                data.general_info.branch_name = "Westend".into();
                insert_report(conn, "r1", &data, "2024-06-01T09:00:00.000000Z")?;

                let row = get_report_row(conn, "r1")?.unwrap();
                assert_eq!(row.status, "draft");
                let report = row.into_report()?;
                assert_eq!(report.data, data);
                assert_eq!(report.created_at, report.updated_at);

                data.status = ReportStatus::Submitted;
                assert!(replace_report(conn, "r1", &data, "2024-06-02T09:00:00.000000Z")?);
                assert!(!replace_report(conn, "r2", &data, "2024-06-02T09:00:00.000000Z")?);

                let row = get_report_row(conn, "r1")?.unwrap();
                assert_eq!(row.status, "submitted");
                assert_eq!(row.updated_at, "2024-06-02T09:00:00.000000Z");
                assert_eq!(row.created_at, "2024-06-01T09:00:00.000000Z");

                assert!(delete_report(conn, "r1")?);
                assert!(get_report_row(conn, "r1")?.is_none());
                Ok::<(), Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::open_memory().await.unwrap();

        let ids: Vec<String> = db
            .writer()
            .call(|conn| {
                let data = ReportData::default();
                insert_report(conn, "old", &data, "2024-01-01T00:00:00.000000Z")?;
                insert_report(conn, "new", &data, "2024-03-01T00:00:00.000000Z")?;
                insert_report(conn, "tie", &data, "2024-03-01T00:00:00.000000Z")?;
                let rows = list_report_rows(conn)?;
                Ok::<_, Error>(rows.into_iter().map(|r| r.id).collect())
            })
            .await
            .unwrap();

        assert_eq!(ids, ["tie", "new", "old"]);
    }

    #[tokio::test]
    async fn test_status_column_rejects_unknown_values() {
        let db = Database::open_memory().await.unwrap();

        let result = db
            .writer()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO reports (id, document, status, created_at, updated_at)
                     VALUES ('x', '{}', 'archived', 'a', 'a')",
                    [],
                )
            })
            .await;
        assert!(result.is_err());
    }
}
