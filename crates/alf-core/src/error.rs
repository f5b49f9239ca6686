use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlfError {
    #[error("not initialized: run 'alf init'")]
    NotInitialized,

    #[error("unknown wizard step: {0}")]
    UnknownStep(String),

    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    #[error("step '{step}' is incomplete: {errors}")]
    Validation {
        step: String,
        errors: ValidationErrors,
    },

    #[error("export failed: {0}")]
    Export(String),

    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("unknown rubric template: {0}")]
    UnknownTemplate(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlfError>;
