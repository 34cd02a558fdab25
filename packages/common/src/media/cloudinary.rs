use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio_util::io::ReaderStream;

use super::config::CloudinaryConfig;
use super::error::MediaError;
use super::local_file::LocalFile;
use super::traits::{MediaHost, UploadedMedia};

/// Media host backed by the Cloudinary signed upload API.
pub struct CloudinaryMediaHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryMediaHost {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(MediaError::Config(
                "cloud_name, api_key and api_secret are required".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/auto/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Parameters that take part in the request signature, sorted by key.
    fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("timestamp", timestamp.to_string())];
        if let Some(folder) = self.config.folder.as_ref().filter(|f| !f.is_empty()) {
            params.push(("folder", folder.clone()));
        }
        params.sort_by_key(|(k, _)| *k);
        params
    }
}

/// SHA-256 hex of `k1=v1&k2=v2...{secret}` over key-sorted parameters.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let digest = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    hex::encode(digest)
}

#[async_trait]
impl MediaHost for CloudinaryMediaHost {
    async fn put(&self, file: &LocalFile) -> Result<UploadedMedia, MediaError> {
        let timestamp = chrono::Utc::now().timestamp();
        let params = self.signed_params(timestamp);
        let signature = sign_params(&params, &self.config.api_secret);

        let handle = tokio::fs::File::open(file.path()).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));
        let file_name = file.file_name().unwrap_or("upload").to_string();
        let part = Part::stream_with_length(body, file.size()).file_name(file_name);

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        let res = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&text)
            .map_err(|e| MediaError::MalformedResponse(e.to_string()))?;

        Ok(UploadedMedia {
            url: parsed.secure_url,
            public_id: parsed.public_id,
            duration_seconds: parsed.duration,
        })
    }
}
