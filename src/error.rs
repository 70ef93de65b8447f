//! Error types shared by the simulation and its hosts

/// A model failed to load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load model {path}: {reason}")]
pub struct AssetLoadError {
    pub path: String,
    pub reason: String,
}

impl AssetLoadError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Start-up failures that prevent the game from running at all
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("car model unavailable: {0}")]
    CarModel(#[from] AssetLoadError),
    #[error("game already started")]
    AlreadyStarted,
}

/// Malformed or out-of-range configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}
