use thiserror::Error;

/// Error types for scene configuration and asset decoding
#[derive(Error, Debug)]
pub enum Error {
    #[error("HDR decode error: {0}")]
    Hdr(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
