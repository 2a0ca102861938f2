use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("{0} service not found")]
    ServiceNotFound(String),

    #[error("Storage API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Workspace connection is missing `{0}`")]
    InvalidWorkspace(&'static str),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Errors the operator can fix themselves (bad token, bad config).
    /// Everything else is reported as an application failure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::Authorization(_) | AppError::Config(_))
    }
}

/// Exit code for a failed run: 1 for user errors, 2 for everything else.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AppError>() {
        Some(app_err) if app_err.is_user_error() => 1,
        _ => 2,
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
