use std::path::Path;

use tempfile::TempPath;

/// A request-scoped temporary file waiting to be uploaded.
///
/// The backing file is removed when the value is dropped, so every code path
/// that ends the request (success, validation error, upload failure) cleans
/// up the disk.
#[derive(Debug)]
pub struct LocalFile {
    path: TempPath,
    file_name: Option<String>,
    size: u64,
}

impl LocalFile {
    pub fn new(path: TempPath, file_name: Option<String>, size: u64) -> Self {
        Self {
            path,
            file_name,
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original filename sent by the client, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Lowercased extension of the client filename, restricted to short
    /// alphanumeric values so it is safe to reuse in object names.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Remove the backing file now instead of waiting for drop.
    pub fn discard(self) -> std::io::Result<()> {
        self.path.close()
    }
}
