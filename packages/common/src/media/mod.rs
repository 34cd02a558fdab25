mod error;
mod local_file;
mod traits;

pub mod cloudinary;
pub mod config;
pub mod filesystem;

use std::sync::Arc;

pub use config::{CloudinaryConfig, LocalMediaConfig, MediaConfig, MediaProvider};
pub use error::MediaError;
pub use local_file::LocalFile;
pub use traits::{MediaHost, UploadedMedia};

/// Build the media host selected by `config.provider`.
pub async fn build_host(config: &MediaConfig) -> Result<Arc<dyn MediaHost>, MediaError> {
    match config.provider {
        MediaProvider::Local => {
            let host = filesystem::FilesystemMediaHost::new(
                config.local.root.clone(),
                config.local.public_base_url.clone(),
            )
            .await?;
            tracing::info!(root = %config.local.root.display(), "Using filesystem media host");
            Ok(Arc::new(host))
        }
        MediaProvider::Cloudinary => {
            let host = cloudinary::CloudinaryMediaHost::new(config.cloudinary.clone())?;
            tracing::info!(
                cloud_name = %config.cloudinary.cloud_name,
                "Using Cloudinary media host"
            );
            Ok(Arc::new(host))
        }
    }
}
