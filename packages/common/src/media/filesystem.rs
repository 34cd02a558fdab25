use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::error::MediaError;
use super::local_file::LocalFile;
use super::traits::{MediaHost, UploadedMedia};

/// Media host that keeps assets in a local directory.
///
/// Files are stored flat as `{root}/{uuid}.{ext}` and addressed as
/// `{public_base_url}/{uuid}.{ext}`. Serving `root` is the caller's job.
pub struct FilesystemMediaHost {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemMediaHost {
    pub async fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
    ) -> Result<Self, MediaError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            root,
            public_base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_name(file: &LocalFile) -> String {
        let id = Uuid::now_v7();
        match file.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }
}

#[async_trait]
impl MediaHost for FilesystemMediaHost {
    async fn put(&self, file: &LocalFile) -> Result<UploadedMedia, MediaError> {
        let name = Self::object_name(file);
        let temp_path = self.root.join(".tmp").join(&name);
        let dest = self.root.join(&name);

        if let Err(e) = fs::copy(file.path(), &temp_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &dest).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(UploadedMedia {
            url: format!("{}/{}", self.public_base_url, name),
            public_id: name,
            duration_seconds: None,
        })
    }
}
