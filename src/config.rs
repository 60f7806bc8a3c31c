use std::time::Duration;

use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
use crate::error::{Error, Result};
use crate::quarter::ReportingQuarters;
use crate::schema::validate::{ValidationContext, DEFAULT_MAX_PHOTOS_PER_ENTRY};
use crate::storage::{repository, Database};

pub const AUTOSAVE_DELAY_MS: &str = "autosave_delay_ms";
pub const REPORTING_QUARTERS: &str = "reporting_quarters";
pub const MAX_PHOTOS_PER_ENTRY: &str = "max_photos_per_entry";

/// Keys the `app_config` table understands.
pub const KNOWN_KEYS: [&str; 3] = [AUTOSAVE_DELAY_MS, REPORTING_QUARTERS, MAX_PHOTOS_PER_ENTRY];

/// Runtime settings, read from `app_config` with defaults for missing keys.
#[derive(Debug, Clone)]
pub struct Settings {
    pub autosave_delay: Duration,
    pub quarters: ReportingQuarters,
    pub max_photos_per_entry: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            quarters: ReportingQuarters::default(),
            max_photos_per_entry: DEFAULT_MAX_PHOTOS_PER_ENTRY,
        }
    }
}

impl Settings {
    pub async fn load(db: &Database) -> Result<Self> {
        let pairs = db
            .reader()
            .call(|conn| repository::list_config(conn))
            .await?;

        let mut settings = Settings::default();
        for (key, value) in pairs {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown config key {key}");
                continue;
            }
            settings.apply(&key, &value)?;
        }
        Ok(settings)
    }

    /// Check a value before it is written. Unknown keys are rejected.
    pub fn check(key: &str, value: &str) -> Result<()> {
        Settings::default().apply(key, value)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            AUTOSAVE_DELAY_MS => {
                let ms: u64 = value.trim().parse().map_err(|_| {
                    Error::Config(format!("{key} must be a whole number of milliseconds, got '{value}'"))
                })?;
                self.autosave_delay = Duration::from_millis(ms);
            }
            REPORTING_QUARTERS => {
                self.quarters = ReportingQuarters::parse_list(value)
                    .map_err(|e| Error::Config(format!("{key}: {e}")))?;
            }
            MAX_PHOTOS_PER_ENTRY => {
                self.max_photos_per_entry = value.trim().parse().map_err(|_| {
                    Error::Config(format!("{key} must be a non-negative whole number, got '{value}'"))
                })?;
            }
            other => {
                return Err(Error::Config(format!(
                    "unknown config key '{other}' (known: {})",
                    KNOWN_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            quarters: self.quarters.clone(),
            max_photos_per_entry: self.max_photos_per_entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let db = Database::open_memory().await.unwrap();
        let settings = Settings::load(&db).await.unwrap();
        assert_eq!(settings.autosave_delay, Duration::from_millis(2000));
        assert_eq!(settings.max_photos_per_entry, 4);
        assert_eq!(settings.quarters.labels().len(), 8);
    }

    #[tokio::test]
    async fn test_load_overrides() {
        let db = Database::open_memory().await.unwrap();
        db.writer()
            .call(|conn| {
                repository::set_config(conn, AUTOSAVE_DELAY_MS, "500")?;
                repository::set_config(conn, REPORTING_QUARTERS, "Q1 2024, Q2 2024")?;
                repository::set_config(conn, MAX_PHOTOS_PER_ENTRY, "6")?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let settings = Settings::load(&db).await.unwrap();
        assert_eq!(settings.autosave_delay, Duration::from_millis(500));
        assert_eq!(settings.max_photos_per_entry, 6);
        assert!(settings.quarters.contains("Q2 2024"));
        assert!(!settings.quarters.contains("Q3 2024"));

        let ctx = settings.validation_context();
        assert_eq!(ctx.max_photos_per_entry, 6);
    }

    #[tokio::test]
    async fn test_malformed_value_is_config_error() {
        let db = Database::open_memory().await.unwrap();
        db.writer()
            .call(|conn| repository::set_config(conn, AUTOSAVE_DELAY_MS, "soon"))
            .await
            .unwrap();

        assert!(matches!(Settings::load(&db).await, Err(Error::Config(_))));
    }

    #[test]
    fn test_check() {
        assert!(Settings::check(MAX_PHOTOS_PER_ENTRY, "3").is_ok());
        assert!(Settings::check(MAX_PHOTOS_PER_ENTRY, "-1").is_err());
        assert!(Settings::check(REPORTING_QUARTERS, "Q5 2024").is_err());
        assert!(matches!(Settings::check("theme", "dark"), Err(Error::Config(_))));
    }
}
