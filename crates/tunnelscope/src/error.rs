use thiserror::Error;

use crate::credentials::CredentialStatus;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A fetch was attempted with no stored credential. No request was sent.
    #[error("Please enter your Ngrok API Key first.")]
    CredentialRequired,

    #[error("Cannot {operation} while credential is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: CredentialStatus,
    },

    /// Human-readable failure reported by the gateway, or the local stand-in
    /// message when the gateway could not be reached.
    #[error("{0}")]
    Gateway(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
