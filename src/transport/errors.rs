//! Error types for the transport layer.
//!
//! A transport either fails at the network level or receives a non-2xx
//! response. The one classification the reconciliation core cares about is
//! "not found", which the delete operation downgrades to success.

use thiserror::Error;

use crate::transport::HttpMethod;

/// Error returned by a [`Transport`](crate::transport::Transport).
///
/// # Example
///
/// ```rust
/// use apistate::transport::{HttpMethod, TransportError};
///
/// let error = TransportError::Response {
///     code: 404,
///     method: HttpMethod::Get,
///     path: "/widgets/42".to_string(),
///     message: r#"{"error":"no such widget"}"#.to_string(),
/// };
/// assert!(error.is_not_found());
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote API answered with a non-successful status code.
    #[error("unexpected response from {method} {path}: {code} {message}")]
    Response {
        /// The HTTP status code of the response.
        code: u16,
        /// The method the request was sent with.
        method: HttpMethod,
        /// The resolved path the request was sent to.
        path: String,
        /// The response body, serialized for diagnostics.
        message: String,
    },

    /// The request never produced a response (connection failure, timeout,
    /// cancellation). Propagated verbatim; the core does not retry.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl TransportError {
    /// Whether this failure means the remote resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Response { code: 404, .. })
    }
}
