use thiserror::Error;

/// Errors raised while pushing a local file to a media host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Reading the local file or writing to the filesystem host failed.
    #[error("media IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request to the remote host could not be completed.
    #[error("media host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote host answered with a non-success status.
    #[error("media host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The remote host answered 2xx but the body was not what we expected.
    #[error("malformed media host response: {0}")]
    MalformedResponse(String),

    /// The host is missing required configuration.
    #[error("media host misconfigured: {0}")]
    Config(String),
}
