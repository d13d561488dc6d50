use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("Not a vault directory: {path}")]
    InvalidVault { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0:?}")]
    Api(ApiErrorObject),

    #[error("No JSON object found in model reply")]
    NoPlanPayload,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error envelope returned by the Anthropic API on non-2xx responses.
#[derive(Debug, Clone)]
pub struct ApiErrorObject {
    pub r#type: Option<String>,
    pub message: String,
    pub status: u16,
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
