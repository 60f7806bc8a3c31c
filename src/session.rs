//! One open report: the draft, its autosave controller and the stores it
//! persists to.
//!
//! Edits are synchronous and never fail. Persisting happens on
//! [`ReportSession::save`], [`ReportSession::submit`], or when the quiet
//! period after the last edit has elapsed ([`ReportSession::tick`],
//! [`ReportSession::autosave_when_due`]).

use std::sync::Arc;

use tokio::time::Instant;

use crate::autosave::{AutosaveController, SaveState};
use crate::completion::{is_section_complete, CompletionSummary, Section};
use crate::config::Settings;
use crate::draft::{DraftState, SectionUpdate};
use crate::editor::{self, ActivityList};
use crate::error::{Error, Result};
use crate::schema::{ReportData, ReportPatch, ReportStatus};
use crate::storage::{upload_batch, PhotoFile, PhotoStore, ReportStore};

pub struct ReportSession {
    reports: Arc<dyn ReportStore>,
    photos: Arc<dyn PhotoStore>,
    draft: DraftState,
    autosave: AutosaveController,
    report_id: Option<String>,
    max_photos_per_entry: usize,
}

/// Errors the user can act on pass through. Anything else is a transient
/// failure of the attempt and the draft is kept for a retry.
fn persist_error(e: Error) -> Error {
    match e {
        Error::Validation(_)
        | Error::Submitted(_)
        | Error::Config(_)
        | Error::NotFound(_)
        | Error::PersistAttemptFailed(_) => e,
        other => Error::PersistAttemptFailed(other.to_string()),
    }
}

impl ReportSession {
    /// Start a blank report. Nothing is stored until the first [`save`](Self::save).
    pub fn new(reports: Arc<dyn ReportStore>, photos: Arc<dyn PhotoStore>, settings: &Settings) -> Self {
        Self {
            reports,
            photos,
            draft: DraftState::new(),
            autosave: AutosaveController::new(settings.autosave_delay),
            report_id: None,
            max_photos_per_entry: settings.max_photos_per_entry,
        }
    }

    /// Load a stored report for editing.
    pub async fn open(
        reports: Arc<dyn ReportStore>,
        photos: Arc<dyn PhotoStore>,
        settings: &Settings,
        id: &str,
    ) -> Result<Self> {
        let report = reports
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut session = Self::new(reports, photos, settings);
        session.draft = DraftState::from_report(&report);
        session.report_id = Some(report.id);
        Ok(session)
    }

    pub fn report_id(&self) -> Option<&str> {
        self.report_id.as_deref()
    }

    pub fn data(&self) -> &ReportData {
        self.draft.data()
    }

    pub fn save_state(&self) -> SaveState {
        self.autosave.state()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.autosave.last_error()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.has_unsaved_changes()
    }

    pub fn completion(&self) -> CompletionSummary {
        CompletionSummary::evaluate(Some(self.draft.data()))
    }

    pub fn is_section_complete(&self, section: Section) -> bool {
        is_section_complete(Some(self.draft.data()), section)
    }

    // ── Editing ────────────────────────────────────────────────────

    /// Replace one section of the draft and restart the quiet period.
    pub fn update_section(&mut self, update: SectionUpdate) -> &ReportData {
        self.autosave.on_edit(Instant::now());
        self.draft.update_section(update)
    }

    /// Append a blank entry to `list`. Returns its id.
    pub fn add_entry(&mut self, list: ActivityList) -> String {
        let (update, id) = editor::add_entry(self.draft.data(), list);
        self.update_section(update);
        id
    }

    pub fn edit_entry(&mut self, list: ActivityList, id: &str, edit: editor::EntryEdit) -> Result<()> {
        let update = editor::edit_entry(self.draft.data(), list, id, edit)
            .ok_or_else(|| Error::NotFound(format!("{list} entry {id}")))?;
        self.update_section(update);
        Ok(())
    }

    pub fn remove_entry(&mut self, list: ActivityList, id: &str) {
        let update = editor::remove_entry(self.draft.data(), list, id);
        self.update_section(update);
    }

    // ── Persisting ─────────────────────────────────────────────────

    /// When the pending autosave is due, if one can fire.
    pub fn next_autosave(&self) -> Option<Instant> {
        if self.report_id.is_none() || self.autosave.state() != SaveState::Dirty {
            return None;
        }
        self.autosave.deadline()
    }

    /// Persist the draft if the quiet period has elapsed. `None` when
    /// nothing was due.
    pub async fn tick(&mut self) -> Option<Result<()>> {
        if !self.autosave.poll(Instant::now(), self.report_id.is_some()) {
            return None;
        }
        let id = self.report_id.clone()?;
        let patch = ReportPatch::full(self.draft.data());
        let result = self.reports.update(&id, patch).await;
        Some(self.finish_save(result))
    }

    /// Wait for the pending autosave, then run it. Returns immediately with
    /// `None` when no autosave is pending.
    pub async fn autosave_when_due(&mut self) -> Option<Result<()>> {
        let deadline = self.next_autosave()?;
        tokio::time::sleep_until(deadline).await;
        self.tick().await
    }

    /// Save now. A new report is created and its id adopted; an existing one
    /// is updated with the whole draft.
    pub async fn save(&mut self) -> Result<()> {
        self.autosave.begin_manual_save();
        let data = self.draft.data().clone();
        let result = self.persist(&data).await;
        self.finish_save(result)
    }

    /// Mark the report submitted and save it. On failure the draft keeps
    /// its previous status.
    pub async fn submit(&mut self) -> Result<()> {
        self.autosave.begin_manual_save();
        let mut data = self.draft.data().clone();
        data.status = ReportStatus::Submitted;

        let result = self.persist(&data).await;
        if result.is_ok() {
            self.draft.replace(data);
            if let Some(id) = &self.report_id {
                log::info!("Report {id} submitted");
            }
        }
        self.finish_save(result)
    }

    async fn persist(&mut self, data: &ReportData) -> Result<()> {
        match self.report_id.clone() {
            Some(id) => self.reports.update(&id, ReportPatch::full(data)).await,
            None => {
                let id = self.reports.create(data).await?;
                self.report_id = Some(id);
                Ok(())
            }
        }
    }

    fn finish_save(&mut self, result: Result<()>) -> Result<()> {
        let now = Instant::now();
        match result {
            Ok(()) => {
                self.autosave.on_save_succeeded(now);
                self.autosave.on_report_created(now);
                Ok(())
            }
            Err(e) => {
                let e = persist_error(e);
                self.autosave.on_save_failed(now, e.to_string());
                Err(e)
            }
        }
    }

    // ── Photos ─────────────────────────────────────────────────────

    /// Photo changes touch the store immediately, so they are refused once
    /// the report is submitted.
    fn ensure_unsubmitted(&self) -> Result<()> {
        if self.draft.data().status == ReportStatus::Submitted {
            let id = self.report_id.clone().unwrap_or_default();
            return Err(Error::Submitted(id));
        }
        Ok(())
    }

    fn photo_path(&self, list: ActivityList, entry_id: &str) -> String {
        let owner = self.report_id.as_deref().unwrap_or("unsaved");
        format!("{owner}/{}/{entry_id}", list.key())
    }

    /// Upload `files` and append their URLs to the entry's photos. Files
    /// beyond the per-entry limit are dropped. If any upload fails the
    /// entry is left unchanged.
    pub async fn attach_photos(
        &mut self,
        list: ActivityList,
        entry_id: &str,
        mut files: Vec<PhotoFile>,
    ) -> Result<Vec<String>> {
        self.ensure_unsubmitted()?;
        let mut photos = editor::entry_photos(self.draft.data(), list, entry_id)
            .ok_or_else(|| Error::NotFound(format!("{list} entry {entry_id}")))?;

        let remaining = self.max_photos_per_entry.saturating_sub(photos.len());
        if files.len() > remaining {
            log::warn!(
                "Entry {entry_id} has room for {remaining} more photo(s); ignoring {}",
                files.len() - remaining
            );
            files.truncate(remaining);
        }
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let path = self.photo_path(list, entry_id);
        let urls = upload_batch(self.photos.as_ref(), &path, files).await?;

        photos.extend(urls.iter().cloned());
        let update = editor::set_entry_photos(self.draft.data(), list, entry_id, photos)
            .ok_or_else(|| Error::NotFound(format!("{list} entry {entry_id}")))?;
        self.update_section(update);
        Ok(urls)
    }

    /// Delete the photo at `index` from the store, then from the entry.
    pub async fn remove_photo(&mut self, list: ActivityList, entry_id: &str, index: usize) -> Result<()> {
        self.ensure_unsubmitted()?;
        let mut photos = editor::entry_photos(self.draft.data(), list, entry_id)
            .ok_or_else(|| Error::NotFound(format!("{list} entry {entry_id}")))?;
        if index >= photos.len() {
            return Err(Error::NotFound(format!(
                "photo {index} on {list} entry {entry_id}"
            )));
        }

        self.photos.delete(&photos[index]).await.map_err(|e| match e {
            Error::PhotoOpFailed(_) => e,
            other => Error::PhotoOpFailed(other.to_string()),
        })?;

        photos.remove(index);
        let update = editor::set_entry_photos(self.draft.data(), list, entry_id, photos)
            .ok_or_else(|| Error::NotFound(format!("{list} entry {entry_id}")))?;
        self.update_section(update);
        Ok(())
    }
}
