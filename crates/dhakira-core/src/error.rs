//! Client error types.
//!
//! Defined in `dhakira-core` so views can downcast an `anyhow::Error`
//! coming out of a [`Backend`](crate::backend::Backend) call and pick the
//! right notice without string matching.

use thiserror::Error;

/// Errors that can occur when talking to the dhakira backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend rejected the credentials (HTTP 401).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend answered with a non-OK status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request exceeded the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered OK but the body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A page that needs a profile was reached without one.
    #[error("no active session, log in first")]
    NotLoggedIn,
}

impl ClientError {
    /// Returns the HTTP status, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::AuthenticationFailed(_) => Some(401),
            _ => None,
        }
    }

    /// Text suitable for an inline error or toast.
    ///
    /// Backend errors carry a human-readable `error` field; everything else
    /// falls back to the display form.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } | ClientError::AuthenticationFailed(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Best-effort user-facing message for any error returned by a backend call.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(client) => client.user_message(),
        None => format!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_backend_message() {
        let err = ClientError::Api {
            status: 400,
            message: "Missing required fields".into(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), "Missing required fields");
        assert!(err.to_string().contains("HTTP 400"));
    }

    #[test]
    fn downcast_through_anyhow() {
        let err: anyhow::Error = ClientError::AuthenticationFailed("Invalid password".into()).into();
        assert_eq!(user_message(&err), "Invalid password");

        let other = anyhow::anyhow!("disk full");
        assert_eq!(user_message(&other), "disk full");
    }
}
