use async_trait::async_trait;
use chrono::Utc;

use super::repository;
use super::Database;
use crate::date_util::format_timestamp;
use crate::error::{Error, Result};
use crate::quarter::QuarterLabel;
use crate::schema::validate::{validate_report, ValidationContext};
use crate::schema::{Report, ReportData, ReportPatch, ReportStatus};

/// Where reports are kept. Sessions hold one as `Arc<dyn ReportStore>`.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Validate and insert a new report. Returns the generated id.
    async fn create(&self, data: &ReportData) -> Result<String>;

    /// `Ok(None)` when no report has `id`.
    async fn get(&self, id: &str) -> Result<Option<Report>>;

    /// Merge the provided sections into the stored report and refresh
    /// `updated_at`.
    async fn update(&self, id: &str, patch: ReportPatch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Newest first. Empty when the store cannot be read.
    async fn list(&self) -> Vec<Report>;
}

/// [`ReportStore`] over the local SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
    validation: ValidationContext,
}

impl SqliteStore {
    pub fn new(db: Database, validation: ValidationContext) -> Self {
        Self { db, validation }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn validation(&self) -> &ValidationContext {
        &self.validation
    }
}

/// Unwrap the error our own closures returned from inside `call`.
fn flatten<T>(result: std::result::Result<T, tokio_rusqlite::Error<Error>>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(tokio_rusqlite::Error::Error(e)) => Err(e),
        Err(other) => Err(other.into()),
    }
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn create(&self, data: &ReportData) -> Result<String> {
        validate_report(data, &self.validation)?;

        let id = uuid::Uuid::new_v4().to_string();
        let data = data.clone();
        let timestamp = format_timestamp(Utc::now());
        let row_id = id.clone();
        let result = self
            .db
            .writer()
            .call(move |conn| repository::insert_report(conn, &row_id, &data, &timestamp))
            .await;
        flatten(result)?;

        log::info!("Created report {id}");
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Report>> {
        let id = id.to_string();
        let row = self
            .db
            .reader()
            .call(move |conn| repository::get_report_row(conn, &id))
            .await?;
        row.map(|r| r.into_report()).transpose()
    }

    async fn update(&self, id: &str, patch: ReportPatch) -> Result<()> {
        let id = id.to_string();
        let mut ctx = self.validation.clone();
        let submitting = patch.status == Some(ReportStatus::Submitted);

        let result = self
            .db
            .writer()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let row = repository::get_report_row(&tx, &id)?
                    .ok_or_else(|| Error::NotFound(id.clone()))?;
                let mut data = row.data()?;
                if data.status == ReportStatus::Submitted {
                    return Err(Error::Submitted(id));
                }

                let stored_quarter = data.general_info.reporting_quarter.clone();
                patch.apply_to(&mut data);
                // A draft keeps the quarter it was filed under after that
                // quarter leaves the configured set. Submitting still needs
                // a configured quarter.
                if !submitting && data.general_info.reporting_quarter == stored_quarter {
                    if let Ok(label) = QuarterLabel::parse(&stored_quarter) {
                        ctx.quarters.insert(label);
                    }
                }
                validate_report(&data, &ctx)?;

                repository::replace_report(&tx, &id, &data, &format_timestamp(Utc::now()))?;
                tx.commit()?;
                Ok::<_, Error>(id)
            })
            .await;
        let id = flatten(result)?;

        if submitting {
            log::info!("Submitted report {id}");
        } else {
            log::debug!("Updated report {id}");
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let row_id = id.to_string();
        let deleted = self
            .db
            .writer()
            .call(move |conn| repository::delete_report(conn, &row_id))
            .await?;
        if !deleted {
            return Err(Error::NotFound(id.to_string()));
        }
        log::info!("Deleted report {id}");
        Ok(())
    }

    async fn list(&self) -> Vec<Report> {
        let rows = match self
            .db
            .reader()
            .call(|conn| repository::list_report_rows(conn))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("Listing reports failed, showing none: {e}");
                return Vec::new();
            }
        };

        rows.into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match row.into_report() {
                    Ok(report) => Some(report),
                    Err(e) => {
                        log::warn!("Skipping unreadable report {id}: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}
