use std::path::PathBuf;

use serde::Deserialize;

/// Which media host backs uploads.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaProvider {
    #[default]
    Local,
    Cloudinary,
}

/// App-level media configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MediaConfig {
    #[serde(default)]
    pub provider: MediaProvider,
    #[serde(default)]
    pub local: LocalMediaConfig,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
}

/// Filesystem host settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LocalMediaConfig {
    /// Directory the files are copied into. Default: "./data/media".
    #[serde(default = "default_local_root")]
    pub root: PathBuf,
    /// URL prefix under which `root` is served. Default: "/media".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("./data/media")
}
fn default_public_base_url() -> String {
    "/media".into()
}

impl Default for LocalMediaConfig {
    fn default() -> Self {
        Self {
            root: default_local_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Cloudinary upload API settings.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Default: "https://api.cloudinary.com/v1_1".
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Optional folder assets are placed in.
    #[serde(default)]
    pub folder: Option<String>,
    /// Whole-request timeout. Default: 300.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".into()
}
fn default_timeout_secs() -> u64 {
    300
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_base: default_api_base(),
            folder: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
