use statebind::RuntimeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("invalid step {input:?}: {reason}")]
    InvalidStep { input: String, reason: &'static str },

    #[error("failed to install log subscriber: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidStep { .. } => 2,
            _ => 1,
        }
    }

    pub(crate) fn invalid_step(input: &str, reason: &'static str) -> Self {
        Self::InvalidStep {
            input: input.to_owned(),
            reason,
        }
    }
}
