//! Authorization error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing a usable credential.
///
/// These are terminal for the current call: the credential store never
/// retries on its own.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("client secrets file not found: {0}")]
    MissingClientSecrets(PathBuf),

    #[error("client secrets file is malformed: {0}")]
    InvalidClientSecrets(String),

    #[error("token refresh was rejected: {0}")]
    RefreshRejected(String),

    #[error("authorization flow failed: {0}")]
    FlowFailed(String),

    #[error("authorization state mismatch")]
    StateMismatch,

    #[error("unexpected token endpoint response: {0}")]
    InvalidTokenResponse(String),

    #[error("token storage error: {0}")]
    Storage(String),

    #[error("network error during authorization: {0}")]
    Network(#[from] reqwest::Error),
}
