//! Error types shared between the backend and its clients

use thiserror::Error;

/// Why a request could not be authenticated, or why a credential could
/// not be issued.
///
/// `ExpiredCredential` exists for internal diagnostics only. Anything that
/// reaches a client reports it exactly like `InvalidCredential`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token not provided")]
    MissingCredential,

    #[error("Token invalid")]
    InvalidCredential,

    #[error("Token expired")]
    ExpiredCredential,

    #[error("Could not sign credential: {0}")]
    SigningFailure(String),
}

impl AuthError {
    /// True for the kinds caused by what the caller presented (HTTP 401),
    /// false for service faults (HTTP 500).
    pub fn is_credential_rejection(&self) -> bool {
        !matches!(self, AuthError::SigningFailure(_))
    }

    /// Message safe to show a client.
    ///
    /// Collapses expiry into "invalid" and hides signing details.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "Token not provided",
            AuthError::InvalidCredential | AuthError::ExpiredCredential => "Token invalid",
            AuthError::SigningFailure(_) => "An internal error occurred",
        }
    }
}
