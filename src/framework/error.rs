//! # Client Errors
//!
//! This module defines the error type every remote call returns. By centralizing
//! error definitions, the whole call surface shares one taxonomy:
//!
//! - [`Error::BadServerResponse`]: the reply did not have the expected shape.
//! - [`Error::Failure`]: the server reported a failure; see [`Failure`].
//! - [`Error::VersionMismatch`]: raised only by the explicit version check.
//! - [`Error::Transport`]: the transport could not deliver the call.

use crate::framework::failure::{Failure, FailureKind};
use crate::framework::version::ApiVersion;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Bad server response: {0}")]
    BadServerResponse(String),
    #[error(transparent)]
    Failure(#[from] Failure),
    #[error("API version mismatch: client speaks {client}, server speaks {server}")]
    VersionMismatch {
        client: ApiVersion,
        server: ApiVersion,
    },
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a transport-level problem described by a plain message.
    pub fn transport(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Error::Transport(msg.into())
    }

    /// The remote failure, if this error is one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Error::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// The remote failure kind, if this error is a remote failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }

    /// Prefixes a bad-response message with the record field being decoded.
    pub(crate) fn in_field(self, key: &str) -> Self {
        match self {
            Error::BadServerResponse(msg) => {
                Error::BadServerResponse(format!("field `{key}`: {msg}"))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kind_is_exposed_for_remote_failures_only() {
        let err = Error::from(Failure::new("SESSION_INVALID", vec!["OpaqueRef:x".into()]));
        assert_eq!(err.failure_kind(), Some(FailureKind::SessionInvalid));
        assert_eq!(Error::transport("closed").failure_kind(), None);
    }

    #[test]
    fn in_field_only_touches_bad_responses() {
        let err = Error::BadServerResponse("expected string, got int".into()).in_field("uuid");
        assert_eq!(
            err.to_string(),
            "Bad server response: field `uuid`: expected string, got int"
        );

        let err = Error::transport("closed").in_field("uuid");
        assert_eq!(err.to_string(), "Transport error: closed");
    }
}
