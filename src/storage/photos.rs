use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

static RE_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Blob storage for entry photos. URLs returned by `upload` are what the
/// report documents keep.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `bytes` under `path` (e.g. `<report id>/youthActivities/<entry id>`)
    /// and return a retrievable URL.
    async fn upload(&self, bytes: Vec<u8>, path: &str, file_name: &str) -> Result<String>;

    async fn delete(&self, url: &str) -> Result<()>;
}

/// One picked file.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping its base name.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::PhotoOpFailed(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Writes photos under `<root>/reports/...` and hands out `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn photo_op(e: std::io::Error) -> Error {
        Error::PhotoOpFailed(e.to_string())
    }
}

fn sanitize(segment: &str) -> String {
    let cleaned = RE_UNSAFE.replace_all(segment.trim(), "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn upload(&self, bytes: Vec<u8>, path: &str, file_name: &str) -> Result<String> {
        let mut dir = self.root.join("reports");
        for segment in path.split('/').filter(|s| !s.trim().is_empty()) {
            dir.push(sanitize(segment));
        }
        tokio::fs::create_dir_all(&dir).await.map_err(Self::photo_op)?;
        let dir = tokio::fs::canonicalize(&dir).await.map_err(Self::photo_op)?;

        let short_id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}_{}_{}",
            chrono::Utc::now().timestamp_millis(),
            &short_id[..8],
            sanitize(file_name)
        );
        let target = dir.join(name);
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(Self::photo_op)?;

        let url = Url::from_file_path(&target)
            .map_err(|_| Error::PhotoOpFailed(format!("cannot build URL for {}", target.display())))?;
        log::debug!("Stored photo {url} ({} bytes)", bytes.len());
        Ok(url.to_string())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let parsed =
            Url::parse(url).map_err(|e| Error::PhotoOpFailed(format!("bad photo URL {url}: {e}")))?;
        if parsed.scheme() != "file" {
            return Err(Error::PhotoOpFailed(format!("not a local photo: {url}")));
        }
        let path = parsed
            .to_file_path()
            .map_err(|_| Error::PhotoOpFailed(format!("bad photo URL {url}")))?;
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(Error::PhotoOpFailed(format!("refusing to delete {url}")));
        }

        let root = tokio::fs::canonicalize(self.root.join("reports"))
            .await
            .map_err(Self::photo_op)?;
        let path = tokio::fs::canonicalize(&path).await.map_err(Self::photo_op)?;
        if !path.starts_with(&root) {
            return Err(Error::PhotoOpFailed(format!(
                "refusing to delete {url}: outside the photo store"
            )));
        }

        tokio::fs::remove_file(&path).await.map_err(Self::photo_op)?;
        log::debug!("Deleted photo {url}");
        Ok(())
    }
}

/// Upload a batch concurrently. Either every file is stored and the URLs
/// come back in input order, or none are kept.
pub async fn upload_batch(
    store: &dyn PhotoStore,
    path: &str,
    files: Vec<PhotoFile>,
) -> Result<Vec<String>> {
    let uploads = files.into_iter().map(|file| async move {
        let name = file.file_name.clone();
        store
            .upload(file.bytes, path, &file.file_name)
            .await
            .map_err(|e| (name, e))
    });
    let results = futures::future::join_all(uploads).await;

    let mut urls = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(url) => urls.push(url),
            Err((name, e)) => failures.push(format!("{name}: {e}")),
        }
    }

    if failures.is_empty() {
        return Ok(urls);
    }

    for url in &urls {
        if let Err(e) = store.delete(url).await {
            log::warn!("Could not clean up {url} after failed batch: {e}");
        }
    }
    Err(Error::PhotoOpFailed(failures.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_upload_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path());

        let url = store
            .upload(b"jpeg".to_vec(), "r1/youthActivities/e1", "choir day.jpg")
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("_choir_day.jpg"));

        let path = Url::parse(&url).unwrap().to_file_path().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");
        assert!(path.to_string_lossy().contains("youthActivities"));

        store.delete(&url).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_path_segments_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path());

        let url = store
            .upload(b"x".to_vec(), "../../etc", "../passwd")
            .await
            .unwrap();
        let path = Url::parse(&url).unwrap().to_file_path().unwrap();
        let root = std::fs::canonicalize(dir.path().join("reports")).unwrap();
        assert!(path.starts_with(&root));
    }

    #[tokio::test]
    async fn test_delete_outside_root_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path().join("photos"));
        store.upload(b"x".to_vec(), "r1", "a.jpg").await.unwrap();

        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();
        let url = Url::from_file_path(&outside).unwrap();

        let result = store.delete(url.as_str()).await;
        assert!(matches!(result, Err(Error::PhotoOpFailed(_))));
        assert!(outside.exists());

        let remote = store.delete("https://example.com/a.jpg").await;
        assert!(matches!(remote, Err(Error::PhotoOpFailed(_))));
    }

    /// Delegates to a local store but fails uploads of files named `bad*`.
    struct FlakyStore {
        inner: LocalPhotoStore,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PhotoStore for FlakyStore {
        async fn upload(&self, bytes: Vec<u8>, path: &str, file_name: &str) -> Result<String> {
            if file_name.starts_with("bad") {
                return Err(Error::PhotoOpFailed("upload rejected".into()));
            }
            self.inner.upload(bytes, path, file_name).await
        }

        async fn delete(&self, url: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(url.to_string());
            self.inner.delete(url).await
        }
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path());
        let files = vec![
            PhotoFile::new("one.jpg", b"1".to_vec()),
            PhotoFile::new("two.jpg", b"2".to_vec()),
            PhotoFile::new("three.jpg", b"3".to_vec()),
        ];

        let urls = upload_batch(&store, "r1/facilities/e1", files).await.unwrap();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("one.jpg"));
        assert!(urls[1].ends_with("two.jpg"));
        assert!(urls[2].ends_with("three.jpg"));
    }

    #[tokio::test]
    async fn test_batch_fails_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlakyStore {
            inner: LocalPhotoStore::new(dir.path()),
            deleted: Mutex::new(Vec::new()),
        };
        let files = vec![
            PhotoFile::new("good.jpg", b"1".to_vec()),
            PhotoFile::new("bad.jpg", b"2".to_vec()),
        ];

        let result = upload_batch(&store, "r1/facilities/e1", files).await;
        match result {
            Err(Error::PhotoOpFailed(msg)) => assert!(msg.contains("bad.jpg")),
            other => panic!("expected PhotoOpFailed, got {other:?}"),
        }

        let deleted = store.deleted.lock().unwrap().clone();
        assert_eq!(deleted.len(), 1);
        let path = Url::parse(&deleted[0]).unwrap().to_file_path().unwrap();
        assert!(!path.exists());
    }
}
