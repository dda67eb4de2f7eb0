use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

/// Local filesystem store backing the public `/uploads` route. Receipts and
/// event images live under subdirectories created on demand.
pub struct FileStore {
    root: PathBuf,
}

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.root.join("receipts")
    }

    /// Writes an event image and returns its public relative path.
    pub async fn save_event_image(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let dir = self.root.join("events");
        tokio::fs::create_dir_all(&dir)
            .await
            .context("failed to create events upload directory")?;

        let filename = format!("event-{}.{}", Utc::now().timestamp_millis(), extension);
        tokio::fs::write(dir.join(&filename), bytes)
            .await
            .context("failed to write event image")?;

        Ok(format!("/uploads/events/{filename}"))
    }
}

/// Returns the normalized extension when the filename looks like one of the
/// accepted image formats, checking both the extension allowlist and the
/// mime type it maps to.
pub fn image_extension(filename: &str) -> Option<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())?;

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    let guessed = mime_guess::from_path(filename).first()?;
    (guessed.type_() == mime_guess::mime::IMAGE).then_some(extension)
}
