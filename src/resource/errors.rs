//! Error taxonomy for resource lifecycle operations.
//!
//! Most variants are fatal and abort the current operation. Two get special
//! treatment by the controller:
//!
//! - [`ResourceError::InvalidPayload`] is recoverable for read: discovery of
//!   remote state must not be blocked by a corrupted cached document, so
//!   read logs a warning and continues with whatever parsed.
//! - A not-found [`TransportError`] during delete is downgraded to success
//!   (deleting something that is already gone is not a failure).

use thiserror::Error;

use crate::transport::{InvalidMethodError, TransportError};

/// Error type for lifecycle operations and the builders feeding them.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A payload field in the configuration is not well-formed JSON.
    ///
    /// Fatal for create, update and delete; read degrades to a warning and
    /// continues with a partially constructed option set.
    #[error("`{field}` is not valid JSON: {source}")]
    InvalidPayload {
        /// Which configuration field failed to parse (`data`, `update_data`,
        /// `destroy_data`).
        field: &'static str,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A path template needs `{id}` but no identifier resolved.
    #[error("cannot resolve path from template `{template}`: missing identifier")]
    MissingIdentifier {
        /// The template that could not be resolved.
        template: String,
    },

    /// A composite import identifier had no path separator.
    #[error("invalid import id `{0}` - must be /<full path from server root>/<object id>")]
    InvalidImportFormat(String),

    /// The drift-scope document is malformed. Fatal: silently ignoring it
    /// would hide operator-configured drift behavior.
    #[error("drift_fields is not valid JSON: {0}")]
    DriftParseFailure(#[source] serde_json::Error),

    /// A response body did not contain the configured identifier attribute.
    #[error("response has no value for id attribute `{attribute}`")]
    IdNotFound {
        /// The attribute that was looked up (possibly `/`-nested).
        attribute: String,
    },

    /// A configured method string is not a supported HTTP verb.
    #[error(transparent)]
    InvalidMethod(#[from] InvalidMethodError),

    /// A search-based read located no element matching the search key/value.
    #[error("no result with {search_key} = `{search_value}`")]
    SearchMiss {
        /// The attribute compared against.
        search_key: String,
        /// The value searched for.
        search_value: String,
    },

    /// The `results_key` of a search-based read did not address an array.
    #[error("results_key `{key}` did not locate an array in the response")]
    InvalidSearchResults {
        /// The results key that was followed.
        key: String,
    },

    /// An opaque failure from the transport collaborator.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
