use async_trait::async_trait;

use super::error::MediaError;
use super::local_file::LocalFile;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    /// Durable public URL of the stored asset.
    pub url: String,
    /// Host-specific identifier of the asset.
    pub public_id: String,
    /// Playback length in seconds, when the host reports one.
    pub duration_seconds: Option<f64>,
}

/// Remote media hosting (avatars, thumbnails, video files).
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Push the file at `file.path()` to the host without consuming it.
    async fn put(&self, file: &LocalFile) -> Result<UploadedMedia, MediaError>;

    /// Upload and consume a local file.
    ///
    /// The temporary file is removed whether or not the upload succeeded.
    async fn upload(&self, file: LocalFile) -> Result<UploadedMedia, MediaError> {
        let result = self.put(&file).await;
        if let Err(e) = file.discard() {
            tracing::warn!("Failed to remove temporary upload file: {e}");
        }
        result
    }
}
