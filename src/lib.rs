//! # apistate
//!
//! A declarative reconciliation engine for RESTful JSON APIs: describe the
//! object you want as a JSON document, and the engine drives the create,
//! read, update, and delete calls that keep the remote object matching it.
//!
//! ## Overview
//!
//! This crate provides:
//! - Provider-level defaults via [`ProviderSettings`] and its builder
//! - Per-resource configuration via [`ResourceConfig`], with path templates,
//!   method and query-string overrides, and alternate payloads per operation
//! - Lifecycle orchestration via [`ResourceLifecycle`]: create, read,
//!   update, delete, and adoption of pre-existing objects through
//!   [`ResourceLifecycle::import`]
//! - Drift detection via [`drift::detect`], with ignore lists, comparison
//!   scoping, and an ignore-everything switch
//! - An async [`Transport`] trait with a reqwest-backed [`HttpTransport`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apistate::{
//!     HttpTransport, ProviderSettings, ResourceConfig, ResourceLifecycle, ResourceRecord,
//! };
//!
//! let transport = HttpTransport::new("https://api.example.com");
//! let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
//!
//! let config = ResourceConfig {
//!     path: "/widgets".to_string(),
//!     data: r#"{"name": "my-widget", "color": "green"}"#.to_string(),
//!     ..ResourceConfig::default()
//! };
//! let mut record = ResourceRecord::new(config);
//!
//! lifecycle.create(&mut record).await?;
//! println!("created object {}", record.id);
//!
//! // Later: refresh local state, reconciling remote drift into `data`.
//! lifecycle.read(&mut record).await?;
//! ```
//!
//! ## Adopting Existing Objects
//!
//! Objects created outside the engine are adopted from a composite
//! identifier, the full collection path plus the object id:
//!
//! ```rust,ignore
//! let record = lifecycle.import("/api/v2/widgets/abc123").await?;
//! assert_eq!(record.id, "abc123");
//! ```
//!
//! ## Tolerating Remote Drift
//!
//! By default any remote change overwrites the declared document on read.
//! [`ResourceConfig`] narrows that: `ignore_changes_to` tolerates changes
//! under named field paths, `drift_fields` restricts comparison to the
//! fields of a scope document, and `ignore_all_server_changes` pins the
//! declared document entirely.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Stateless operations**: Every lifecycle call rebuilds its options from
//!   configuration; nothing is cached between calls
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod config;
pub mod drift;
pub mod resource;
pub mod transport;

// Re-export public types at crate root for convenience
pub use config::{ProviderSettings, ProviderSettingsBuilder};
pub use resource::{
    parse_import_id, resolve_path, OperationOptions, ReadSearch, ResourceConfig, ResourceError,
    ResourceLifecycle, ResourceRecord,
};
pub use transport::{HttpMethod, HttpTransport, InvalidMethodError, Transport, TransportError};
