//! Transport layer for talking to the remote API.
//!
//! The reconciliation core never performs I/O directly. Every remote call
//! goes through the [`Transport`] trait, which hands a resolved path, an
//! HTTP method, and an optional JSON payload to a collaborator and gets a
//! parsed JSON body back. [`HttpTransport`] is the reqwest-backed
//! implementation; tests substitute their own.
//!
//! # Example
//!
//! ```rust
//! use apistate::transport::HttpMethod;
//!
//! let method: HttpMethod = "post".parse().unwrap();
//! assert_eq!(method, HttpMethod::Post);
//! assert_eq!(method.to_string(), "POST");
//! ```

mod errors;
mod http;

pub use errors::TransportError;
pub use http::HttpTransport;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

/// HTTP methods the lifecycle operations can be configured with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for reading resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partial updates.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Error returned when a configured method string is not a supported verb.
#[derive(Debug, Error)]
#[error("unsupported HTTP method `{0}`")]
pub struct InvalidMethodError(pub String);

impl FromStr for HttpMethod {
    type Err = InvalidMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(InvalidMethodError(s.to_string())),
        }
    }
}

/// The external collaborator that physically executes remote calls.
///
/// Paths are already fully resolved (templates substituted, query string
/// appended) by the time they reach a transport. The transport reports
/// failures through [`TransportError`] and never retries; cancellation and
/// timeout behavior belong to the caller's execution context.
///
/// All methods return the parsed JSON response body. Identifier extraction
/// happens in the lifecycle controller, which knows the resource-scoped
/// `id_attribute`.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Creates a remote resource and returns the response body.
    async fn create(
        &self,
        path: &str,
        method: HttpMethod,
        payload: &Value,
    ) -> Result<Value, TransportError>;

    /// Reads the remote resource at `path`.
    async fn read(&self, path: &str, method: HttpMethod) -> Result<Value, TransportError>;

    /// Updates the remote resource at `path` with `payload`.
    async fn update(
        &self,
        path: &str,
        method: HttpMethod,
        payload: &Value,
    ) -> Result<Value, TransportError>;

    /// Deletes the remote resource at `path`, with an optional payload for
    /// APIs whose delete endpoints take a body.
    async fn delete(
        &self,
        path: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpMethod>();
    assert_send_sync::<TransportError>();
    assert_send_sync::<HttpTransport>();
};
