use std::collections::HashMap;
use std::path::Path;

use axum::extract::{FromRequest, Multipart, Request, multipart::Field};
use common::media::LocalFile;
use mime_guess::mime;
use tokio::io::AsyncWriteExt;

use crate::error::AppError;
use crate::state::AppState;

/// What a file field must contain, judged from the client filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn accepts(self, file_name: &str) -> bool {
        let Some(guess) = mime_guess::from_path(file_name).first() else {
            return false;
        };
        match self {
            MediaKind::Image => guess.type_() == mime::IMAGE,
            MediaKind::Video => guess.type_() == mime::VIDEO,
        }
    }

    fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "an image",
            MediaKind::Video => "a video",
        }
    }
}

/// A parsed `multipart/form-data` body.
///
/// File parts are spooled to request-scoped temp files as they stream in;
/// anything not taken by the handler is deleted when the form is dropped.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, LocalFile>,
}

impl UploadForm {
    /// Trimmed, non-empty text value of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Untrimmed text value of a field (passwords).
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take an optional file field, checking its type when present.
    pub fn take_file(&mut self, name: &str, kind: MediaKind) -> Result<Option<LocalFile>, AppError> {
        let Some(file) = self.files.remove(name) else {
            return Ok(None);
        };
        let file_name = file.file_name().unwrap_or_default();
        if !kind.accepts(file_name) {
            return Err(AppError::Validation(format!(
                "{name} must be {}",
                kind.label()
            )));
        }
        Ok(Some(file))
    }

    pub fn require_file(&mut self, name: &str, kind: MediaKind) -> Result<LocalFile, AppError> {
        self.take_file(name, kind)?
            .ok_or_else(|| AppError::Validation(format!("{name} file is required")))
    }
}

impl FromRequest<AppState> for UploadForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {}", e.body_text())))?;

        let limit = state.config.upload.max_file_size;
        let temp_dir = state.config.upload.temp_dir.as_deref();
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match field.file_name().map(str::to_owned) {
                // Browsers send an empty filename for an unselected file input.
                Some(file_name) if file_name.is_empty() => continue,
                Some(file_name) => {
                    let file = spool(&mut field, &name, file_name, limit, temp_dir).await?;
                    form.files.insert(name, file);
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}

async fn spool(
    field: &mut Field<'_>,
    name: &str,
    file_name: String,
    limit: u64,
    temp_dir: Option<&Path>,
) -> Result<LocalFile, AppError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("upload-");
    let temp = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    let (std_file, path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(std_file);
    let mut size: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?
    {
        size += chunk.len() as u64;
        if size > limit {
            return Err(AppError::Validation(format!(
                "{name} exceeds the maximum size of {limit} bytes"
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write temp file: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write temp file: {e}")))?;

    tracing::debug!(field = name, size, "Spooled upload to temp file");
    Ok(LocalFile::new(path, Some(file_name), size))
}
