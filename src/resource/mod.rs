//! Resource lifecycle: configuration, path resolution, and orchestration.
//!
//! This module turns a declared resource configuration into remote API
//! calls. The pieces layer cleanly:
//!
//! - [`ResourceConfig`] is the raw per-resource configuration record.
//! - [`OperationOptions`] normalizes it against provider defaults for one
//!   lifecycle invocation.
//! - [`resolve_path`] and friends turn templates plus an identifier into
//!   concrete request paths.
//! - [`parse_import_id`] splits a composite import identifier.
//! - [`ResourceLifecycle`] drives create, read, update, delete, and import
//!   against a [`Transport`](crate::transport::Transport), running drift
//!   detection on read.

mod errors;
mod import;
mod lifecycle;
mod options;
mod path;

pub use errors::ResourceError;
pub use import::parse_import_id;
pub use lifecycle::{ResourceLifecycle, ResourceRecord};
pub use options::{OperationOptions, ReadSearch, ResourceConfig};
pub use path::{append_query, resolve_path, substitute_id, ID_PLACEHOLDER};
