// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use civreg_core::sha256_hex;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug)]
pub struct MediaError(pub String);

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MediaError {}

/// Object-storage collaborator for citizen photos. The production system
/// behind the original used a cloud bucket; everything this service needs
/// is "bytes in, stable location out".
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// Stores an image and returns its serveable location.
    async fn store_image(&self, bytes: Vec<u8>, extension: &str) -> Result<String, MediaError>;
}

/// Filesystem-backed media store. Files are content-addressed so repeated
/// uploads of the same photo land on the same path.
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store_image(&self, bytes: Vec<u8>, extension: &str) -> Result<String, MediaError> {
        let extension = sanitize_extension(extension);
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            let dir = root.join("citizens");
            std::fs::create_dir_all(&dir).map_err(|e| MediaError(e.to_string()))?;
            let name = format!("{}.{extension}", sha256_hex(&bytes));
            let target = dir.join(&name);
            // Write-then-rename so a crashed upload never leaves a partial
            // file at the final path.
            let tmp = dir.join(format!(".{name}.tmp"));
            std::fs::write(&tmp, &bytes).map_err(|e| MediaError(e.to_string()))?;
            std::fs::rename(&tmp, &target).map_err(|e| MediaError(e.to_string()))?;
            Ok(format!("media/citizens/{name}"))
        })
        .await
        .map_err(|e| MediaError(format!("blocking task failed: {e}")))?
    }
}

fn sanitize_extension(extension: &str) -> String {
    let cleaned: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if cleaned.is_empty() {
        "jpg".to_string()
    } else {
        cleaned.to_ascii_lowercase()
    }
}
