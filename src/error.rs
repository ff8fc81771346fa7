use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Record error: {0}")]
    Record(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{api} API error (status {status}): {message}")]
    Api {
        api: String,
        status: u16,
        message: String,
    },
}

impl EtlError {
    /// Startup failures that must stop the process before any pair runs.
    pub fn is_config(&self) -> bool {
        matches!(self, EtlError::Config(_) | EtlError::Toml(_))
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
