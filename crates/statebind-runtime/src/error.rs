use std::path::PathBuf;

use statebind_view::ViewError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("page is not mounted")]
    NotMounted,

    #[error("page is already mounted")]
    AlreadyMounted,
}
