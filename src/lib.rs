pub mod autosave;
pub mod completion;
pub mod config;
pub mod date_util;
pub mod draft;
pub mod editor;
pub mod error;
pub mod quarter;
pub mod schema;
pub mod session;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

pub use autosave::{AutosaveController, SaveState};
pub use completion::{completion_ratio, is_section_complete, CompletionSummary, Section};
pub use config::Settings;
pub use draft::{DraftState, SectionKey, SectionUpdate};
pub use editor::{ActivityList, EntryEdit};
pub use error::{Error, Result};
pub use quarter::{QuarterLabel, ReportingQuarters};
pub use schema::validate::{FieldError, ValidationErrors, ValidationRule};
pub use schema::{Report, ReportData, ReportPatch, ReportStatus};
pub use session::ReportSession;
pub use storage::{Database, LocalPhotoStore, PhotoFile, PhotoStore, ReportStore, SqliteStore};

use storage::repository;

/// Main entry point: the local report database, the photo store and the
/// settings they were opened with.
pub struct BranchReports {
    db: Database,
    reports: Arc<SqliteStore>,
    photos: Arc<LocalPhotoStore>,
    settings: Settings,
}

impl BranchReports {
    /// Load settings from `db` and wire up the stores.
    pub async fn open(db: Database, photo_root: impl Into<PathBuf>) -> Result<Self> {
        let settings = Settings::load(&db).await?;
        let reports = Arc::new(SqliteStore::new(db.clone(), settings.validation_context()));
        let photos = Arc::new(LocalPhotoStore::new(photo_root));
        Ok(Self {
            db,
            reports,
            photos,
            settings,
        })
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn report_store(&self) -> Arc<dyn ReportStore> {
        self.reports.clone()
    }

    pub fn photo_store(&self) -> Arc<dyn PhotoStore> {
        self.photos.clone()
    }

    // ── Reports ────────────────────────────────────────────────────

    /// All reports, newest first. Empty if the database cannot be read.
    pub async fn list_reports(&self) -> Vec<Report> {
        self.reports.list().await
    }

    pub async fn get_report(&self, id: &str) -> Result<Report> {
        self.reports
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Delete a report and, best effort, the photos it references.
    pub async fn delete_report(&self, id: &str) -> Result<()> {
        let report = self.get_report(id).await?;
        self.reports.delete(id).await?;

        for url in photo_urls(&report.data) {
            if let Err(e) = self.photos.delete(url).await {
                log::warn!("Could not delete photo {url} of report {id}: {e}");
            }
        }
        Ok(())
    }

    // ── Sessions ───────────────────────────────────────────────────

    /// Start a new, unsaved report.
    pub fn new_session(&self) -> ReportSession {
        ReportSession::new(self.report_store(), self.photo_store(), &self.settings)
    }

    /// Open a stored report for editing.
    pub async fn open_session(&self, id: &str) -> Result<ReportSession> {
        ReportSession::open(self.report_store(), self.photo_store(), &self.settings, id).await
    }

    // ── Config ─────────────────────────────────────────────────────

    pub async fn config_get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        let value = self
            .db
            .reader()
            .call(move |conn| repository::get_config(conn, &key))
            .await?;
        Ok(value)
    }

    /// Store a setting after checking it parses. Takes effect the next
    /// time the database is opened.
    pub async fn config_set(&self, key: &str, value: &str) -> Result<()> {
        Settings::check(key, value)?;
        self.db
            .writer()
            .call({
                let key = key.to_string();
                let value = value.to_string();
                move |conn| repository::set_config(conn, &key, &value)
            })
            .await?;
        Ok(())
    }

    pub async fn config_unset(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let removed = self
            .db
            .writer()
            .call(move |conn| repository::unset_config(conn, &key))
            .await?;
        Ok(removed)
    }

    pub async fn config_list(&self) -> Result<Vec<(String, String)>> {
        let pairs = self
            .db
            .reader()
            .call(|conn| repository::list_config(conn))
            .await?;
        Ok(pairs)
    }
}

/// Every photo URL across the report's entry lists.
fn photo_urls(data: &ReportData) -> Vec<&str> {
    use schema::entries::PhotoEntry;

    fn urls<T: PhotoEntry>(list: &[T]) -> impl Iterator<Item = &str> {
        list.iter().flat_map(|e| e.photos().iter().map(String::as_str))
    }

    urls(&data.youth_activities)
        .chain(urls(&data.divine_services))
        .chain(urls(&data.bible_studies))
        .chain(urls(&data.lay_activities))
        .chain(urls(&data.visitation))
        .chain(urls(&data.prayer_walks))
        .chain(urls(&data.womens_ministry))
        .chain(urls(&data.facilities))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn app(dir: &tempfile::TempDir) -> BranchReports {
        let db = Database::open_memory().await.unwrap();
        BranchReports::open(db, dir.path().join("photos")).await.unwrap()
    }

    #[tokio::test]
    async fn test_config_set_checks_values() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir).await;

        app.config_set("max_photos_per_entry", "2").await.unwrap();
        assert_eq!(
            app.config_get("max_photos_per_entry").await.unwrap().as_deref(),
            Some("2")
        );
        assert!(matches!(
            app.config_set("autosave_delay_ms", "fast").await,
            Err(Error::Config(_))
        ));
        assert_eq!(app.config_list().await.unwrap().len(), 1);

        assert!(app.config_unset("max_photos_per_entry").await.unwrap());
        assert!(app.config_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_apply_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_memory().await.unwrap();
        let app = BranchReports::open(db.clone(), dir.path()).await.unwrap();
        app.config_set("max_photos_per_entry", "1").await.unwrap();

        let app = BranchReports::open(db, dir.path()).await.unwrap();
        assert_eq!(app.settings().max_photos_per_entry, 1);
    }

    #[tokio::test]
    async fn test_delete_report_removes_photos() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir).await;

        let mut session = app.new_session();
        session.save().await.unwrap();
        let entry = session.add_entry(ActivityList::PrayerWalks);
        let urls = session
            .attach_photos(
                ActivityList::PrayerWalks,
                &entry,
                vec![PhotoFile::new("walk.jpg", b"jpeg".to_vec())],
            )
            .await
            .unwrap();
        session.save().await.unwrap();
        let id = session.report_id().unwrap().to_string();

        let path = url::Url::parse(&urls[0]).unwrap().to_file_path().unwrap();
        assert!(path.exists());

        app.delete_report(&id).await.unwrap();
        assert!(!path.exists());
        assert!(matches!(app.get_report(&id).await, Err(Error::NotFound(_))));
        assert!(app.list_reports().await.is_empty());
    }
}
