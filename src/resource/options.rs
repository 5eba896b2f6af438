//! Operation options: layered configuration normalized per lifecycle call.
//!
//! A resource declares its own overrides ([`ResourceConfig`]); the provider
//! supplies coarse defaults ([`ProviderSettings`](crate::config::ProviderSettings)).
//! [`OperationOptions::build`] coalesces the two, field by field, into one
//! normalized record: resource value if explicitly set, otherwise provider
//! default, otherwise empty. Options are built fresh for every lifecycle
//! invocation and carry no identity of their own.
//!
//! Payload fields arrive as JSON text and are validated here. A malformed
//! payload is an [`ResourceError::InvalidPayload`], but
//! [`OperationOptions::build_lenient`] still hands back the partially
//! constructed options so a read can continue discovering remote state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderSettings;
use crate::resource::path::{append_query, resolve_path};
use crate::resource::ResourceError;
use crate::transport::HttpMethod;

/// The resource-scoped configuration record, as the host's declared-state
/// store hands it over.
///
/// Every field except `path` and `data` is optional; unset fields fall back
/// to provider defaults (methods, `id_attribute`) or stay empty (paths,
/// query strings, payloads).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// The API path representing objects of this type on the server.
    pub path: String,
    /// Override path for create; defaults to `path`.
    pub create_path: Option<String>,
    /// Override path for read; defaults to `path/{id}`.
    pub read_path: Option<String>,
    /// Override path for update; defaults to `path/{id}`.
    pub update_path: Option<String>,
    /// Override path for destroy; defaults to `path/{id}`.
    pub destroy_path: Option<String>,
    /// Per-resource method override for create.
    pub create_method: Option<String>,
    /// Per-resource method override for read.
    pub read_method: Option<String>,
    /// Per-resource method override for update.
    pub update_method: Option<String>,
    /// Per-resource method override for destroy.
    pub destroy_method: Option<String>,
    /// Query string shared by all operations unless overridden per-op.
    pub query_string: Option<String>,
    /// Query string for create, overriding `query_string`.
    pub create_query_string: Option<String>,
    /// Query string for read, overriding `query_string`.
    pub read_query_string: Option<String>,
    /// Query string for update, overriding `query_string`.
    pub update_query_string: Option<String>,
    /// Query string for destroy, overriding `query_string`.
    pub destroy_query_string: Option<String>,
    /// Per-resource override of the provider's identifier attribute.
    pub id_attribute: Option<String>,
    /// Manually pinned object identifier; wins over any cached identifier.
    pub object_id: Option<String>,
    /// The declared-state document, as JSON text.
    pub data: String,
    /// Optional JSON payload sent on update instead of `data`.
    pub update_data: Option<String>,
    /// Optional JSON payload sent on destroy.
    pub destroy_data: Option<String>,
    /// Search specification for read, as a loose string-keyed map.
    pub read_search: HashMap<String, Value>,
    /// Dot-separated field paths whose remote changes are tolerated.
    pub ignore_changes_to: Vec<String>,
    /// When true, remote changes never overwrite declared state.
    pub ignore_all_server_changes: bool,
    /// Optional JSON document restricting drift comparison to its fields.
    pub drift_fields: Option<String>,
    /// When true, `data` itself is the drift comparison scope.
    pub drift_fields_from_data: bool,
    /// Fields whose change forces recreation instead of update. Carried for
    /// the host; the core does not act on it.
    pub force_new: Vec<String>,
    /// Verbose logging for operations on this resource.
    pub debug: bool,
}

/// Typed search specification for read operations.
///
/// Expanded from the loose `read_search` map: known keys are picked out,
/// unknown keys are ignored, and every value is coerced to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSearch {
    /// The attribute compared against `search_value` in each result.
    pub search_key: String,
    /// The value identifying the wanted result.
    pub search_value: String,
    /// Where the result array lives in the response (`/`-nested). Empty
    /// means the response body itself is the array.
    pub results_key: String,
    /// Query string appended to the collection path for the search request.
    pub query_string: String,
}

impl ReadSearch {
    /// Expands the loose map into a typed search spec.
    ///
    /// Returns `None` for an empty map, meaning reads go directly by id.
    #[must_use]
    pub fn from_map(map: &HashMap<String, Value>) -> Option<Self> {
        if map.is_empty() {
            return None;
        }
        let mut search = Self::default();
        for (key, value) in map {
            let text = coerce_text(value);
            match key.as_str() {
                "search_key" => search.search_key = text,
                "search_value" => search.search_value = text,
                "results_key" => search.results_key = text,
                "query_string" => search.query_string = text,
                _ => {}
            }
        }
        Some(search)
    }
}

/// The normalized per-invocation option set every lifecycle operation
/// consumes. Pure configuration, not state.
#[derive(Debug, Clone)]
pub struct OperationOptions {
    /// Base API path for the resource type.
    pub path: String,
    /// Resolved per-operation path overrides.
    pub create_path: Option<String>,
    /// Override template for read.
    pub read_path: Option<String>,
    /// Override template for update.
    pub update_path: Option<String>,
    /// Override template for destroy.
    pub destroy_path: Option<String>,
    /// Method for create, after coalescing.
    pub create_method: HttpMethod,
    /// Method for read, after coalescing.
    pub read_method: HttpMethod,
    /// Method for update, after coalescing.
    pub update_method: HttpMethod,
    /// Method for destroy, after coalescing.
    pub destroy_method: HttpMethod,
    /// Query string for create (per-op override or the shared one).
    pub create_query_string: String,
    /// Query string for read.
    pub read_query_string: String,
    /// Query string for update.
    pub update_query_string: String,
    /// Query string for destroy.
    pub destroy_query_string: String,
    /// The resolved identifier, possibly empty for not-yet-created objects.
    pub id: String,
    /// The attribute responses report identifiers under.
    pub id_attribute: String,
    /// Parsed declared-state document.
    pub data: Value,
    /// Parsed update payload, when configured.
    pub update_data: Option<Value>,
    /// Parsed destroy payload, when configured.
    pub destroy_data: Option<Value>,
    /// Typed search specification, when read goes through a search.
    pub read_search: Option<ReadSearch>,
    /// Fields forcing recreation, carried through for the host.
    pub force_new: Vec<String>,
    /// Verbose logging toggle.
    pub debug: bool,
}

impl OperationOptions {
    /// Builds normalized options, failing on the first malformed field.
    ///
    /// Identifier resolution order: explicit `object_id`, then the
    /// caller's `known_id` (e.g. from prior state), then the identifier
    /// attribute found inside the declared payload itself.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidPayload`] for malformed payload JSON,
    /// [`ResourceError::InvalidMethod`] for an unsupported method string.
    pub fn build(
        config: &ResourceConfig,
        defaults: &ProviderSettings,
        known_id: Option<&str>,
    ) -> Result<Self, ResourceError> {
        match Self::build_lenient(config, defaults, known_id) {
            (options, None) => Ok(options),
            (_, Some(error)) => Err(error),
        }
    }

    /// Builds normalized options, returning the partially constructed
    /// result together with the first error encountered.
    ///
    /// Read paths use this to keep going when cached declared state is
    /// corrupted: a payload that fails to parse is substituted with `{}`
    /// and the error reported alongside.
    #[must_use]
    pub fn build_lenient(
        config: &ResourceConfig,
        defaults: &ProviderSettings,
        known_id: Option<&str>,
    ) -> (Self, Option<ResourceError>) {
        let mut error = None;

        let data = parse_payload("data", &config.data, &mut error);
        let update_data = config
            .update_data
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_payload("update_data", s, &mut error));
        let destroy_data = config
            .destroy_data
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_payload("destroy_data", s, &mut error));

        let id_attribute = coalesce(config.id_attribute.as_deref(), defaults.id_attribute());

        let id = config
            .object_id
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| known_id.map(str::to_string).filter(|s| !s.is_empty()))
            .or_else(|| lookup_attribute(&data, &id_attribute))
            .unwrap_or_default();

        let shared_query = config.query_string.clone().unwrap_or_default();

        let options = Self {
            path: config.path.clone(),
            create_path: config.create_path.clone(),
            read_path: config.read_path.clone(),
            update_path: config.update_path.clone(),
            destroy_path: config.destroy_path.clone(),
            create_method: coalesce_method(
                config.create_method.as_deref(),
                defaults.create_method(),
                &mut error,
            ),
            read_method: coalesce_method(
                config.read_method.as_deref(),
                defaults.read_method(),
                &mut error,
            ),
            update_method: coalesce_method(
                config.update_method.as_deref(),
                defaults.update_method(),
                &mut error,
            ),
            destroy_method: coalesce_method(
                config.destroy_method.as_deref(),
                defaults.destroy_method(),
                &mut error,
            ),
            create_query_string: coalesce(config.create_query_string.as_deref(), &shared_query),
            read_query_string: coalesce(config.read_query_string.as_deref(), &shared_query),
            update_query_string: coalesce(config.update_query_string.as_deref(), &shared_query),
            destroy_query_string: coalesce(config.destroy_query_string.as_deref(), &shared_query),
            id,
            id_attribute,
            data,
            update_data,
            destroy_data,
            read_search: ReadSearch::from_map(&config.read_search),
            force_new: config.force_new.clone(),
            debug: config.debug,
        };

        (options, error)
    }

    /// Resolved create path. Defaults to the bare collection path.
    ///
    /// # Errors
    ///
    /// [`ResourceError::MissingIdentifier`] when an override template needs
    /// `{id}` but no identifier resolved.
    pub fn create_url(&self) -> Result<String, ResourceError> {
        let path = resolve_path(&self.path, self.create_path.as_deref(), &self.id)?;
        Ok(append_query(path, &self.create_query_string))
    }

    /// Resolved read path. Defaults to `path/{id}`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::MissingIdentifier`] when the template needs `{id}`
    /// but no identifier resolved.
    pub fn read_url(&self) -> Result<String, ResourceError> {
        let default = format!("{}/{{id}}", self.path);
        let path = resolve_path(&default, self.read_path.as_deref(), &self.id)?;
        Ok(append_query(path, &self.read_query_string))
    }

    /// Resolved update path. Defaults to `path/{id}`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::MissingIdentifier`] when the template needs `{id}`
    /// but no identifier resolved.
    pub fn update_url(&self) -> Result<String, ResourceError> {
        let default = format!("{}/{{id}}", self.path);
        let path = resolve_path(&default, self.update_path.as_deref(), &self.id)?;
        Ok(append_query(path, &self.update_query_string))
    }

    /// Resolved destroy path. Defaults to `path/{id}`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::MissingIdentifier`] when the template needs `{id}`
    /// but no identifier resolved.
    pub fn destroy_url(&self) -> Result<String, ResourceError> {
        let default = format!("{}/{{id}}", self.path);
        let path = resolve_path(&default, self.destroy_path.as_deref(), &self.id)?;
        Ok(append_query(path, &self.destroy_query_string))
    }
}

/// Resource-level value if explicitly set and non-empty, else the fallback.
fn coalesce(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn coalesce_method(
    value: Option<&str>,
    fallback: HttpMethod,
    error: &mut Option<ResourceError>,
) -> HttpMethod {
    match value {
        Some(v) if !v.is_empty() => match v.parse() {
            Ok(method) => method,
            Err(parse_error) => {
                if error.is_none() {
                    *error = Some(ResourceError::InvalidMethod(parse_error));
                }
                fallback
            }
        },
        _ => fallback,
    }
}

/// Parses a payload field; on failure records the error and substitutes an
/// empty object so lenient callers can continue.
fn parse_payload(field: &'static str, text: &str, error: &mut Option<ResourceError>) -> Value {
    if text.is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(source) => {
            if error.is_none() {
                *error = Some(ResourceError::InvalidPayload { field, source });
            }
            Value::Object(serde_json::Map::new())
        }
    }
}

/// Walks a possibly `/`-nested attribute path through a JSON body.
pub(crate) fn value_at<'a>(body: &'a Value, attribute: &str) -> Option<&'a Value> {
    let mut current = body;
    for segment in attribute.split('/') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Looks up a possibly `/`-nested attribute in a JSON body and renders it
/// as text. Only strings and numbers qualify as identifiers.
pub(crate) fn lookup_attribute(body: &Value, attribute: &str) -> Option<String> {
    match value_at(body, attribute)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
