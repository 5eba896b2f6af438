//! Lifecycle orchestration: create, read, update, delete, import.
//!
//! [`ResourceLifecycle`] is the entry point the host runtime drives. Each
//! operation is stateless and idempotent given the same inputs: it builds a
//! fresh [`OperationOptions`] from the record's configuration, resolves the
//! operation's path, delegates the remote call to the [`Transport`], and —
//! on read — runs drift detection to decide whether the declared-state
//! document gets overwritten with the reconciled one.
//!
//! The controller owns no cross-call state and performs no locking; the
//! host is expected to serialize operations per resource instance. Distinct
//! instances reconcile in parallel without coordination.

use serde_json::{json, Value};

use crate::config::ProviderSettings;
use crate::drift::{self, DriftPolicy};
use crate::resource::options::{lookup_attribute, value_at, OperationOptions, ResourceConfig};
use crate::resource::path::append_query;
use crate::resource::{parse_import_id, ReadSearch, ResourceError};
use crate::transport::Transport;

/// The slice of host-owned state one resource instance occupies: its
/// configuration plus the identifier learned during normal operations.
///
/// An empty `id` means the resource has not been created (or was deleted).
#[derive(Debug, Clone, Default)]
pub struct ResourceRecord {
    /// The stable identifier of the remote object, empty when unknown.
    pub id: String,
    /// The declared configuration, including the `data` document that
    /// read may overwrite after reconciliation.
    pub config: ResourceConfig,
}

impl ResourceRecord {
    /// Creates a record for a resource that does not exist remotely yet.
    #[must_use]
    pub fn new(config: ResourceConfig) -> Self {
        Self {
            id: String::new(),
            config,
        }
    }
}

/// Drives the four lifecycle operations plus import against a transport.
#[derive(Debug)]
pub struct ResourceLifecycle<T> {
    transport: T,
    settings: ProviderSettings,
}

impl<T: Transport> ResourceLifecycle<T> {
    /// Creates a controller from a transport and provider-level defaults.
    pub const fn new(transport: T, settings: ProviderSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Returns the provider settings this controller applies.
    #[must_use]
    pub const fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Creates the remote resource and records its identifier.
    ///
    /// # Errors
    ///
    /// Any builder or transport failure aborts the operation; no partial
    /// success is reported.
    pub async fn create(&self, record: &mut ResourceRecord) -> Result<(), ResourceError> {
        let options = OperationOptions::build(&record.config, &self.settings, Some(&record.id))?;
        let url = options.create_url()?;

        if options.debug {
            tracing::debug!(
                operation = "create",
                path = %url,
                payload = %self.payload_display(&options.data),
                "creating remote resource"
            );
        }

        let body = self
            .transport
            .create(&url, options.create_method, &options.data)
            .await?;

        record.id = extract_id(&body, &options)?;
        tracing::debug!(operation = "create", id = %record.id, "remote resource created");
        Ok(())
    }

    /// Reads the remote resource, records its identifier, and overwrites
    /// the declared-state document when reconciliation found drift.
    ///
    /// A malformed `data` document is tolerated here: discovery of remote
    /// state must proceed even when the cached declared state is corrupt,
    /// so the read continues with whatever parsed and logs a warning.
    ///
    /// # Errors
    ///
    /// Transport failures, unresolvable paths, a malformed drift-scope
    /// document, and search misses are fatal.
    pub async fn read(&self, record: &mut ResourceRecord) -> Result<(), ResourceError> {
        let (options, build_error) =
            OperationOptions::build_lenient(&record.config, &self.settings, Some(&record.id));
        if let Some(error) = build_error {
            match error {
                ResourceError::InvalidPayload { .. } => {
                    tracing::warn!(
                        operation = "read",
                        error = %error,
                        "declared state is invalid; continuing with partially constructed options"
                    );
                }
                fatal => return Err(fatal),
            }
        }

        let observed = match &options.read_search {
            Some(search) => self.search(&options, search).await?,
            None => {
                let url = options.read_url()?;
                self.transport.read(&url, options.read_method).await?
            }
        };

        record.id = extract_id(&observed, &options)?;
        if options.debug {
            tracing::debug!(operation = "read", id = %record.id, "observed remote state");
        }

        // Remote state is never allowed to override declared state when the
        // operator opted out wholesale.
        if record.config.ignore_all_server_changes {
            return Ok(());
        }

        let policy = drift_policy(&record.config)?;
        let (reconciled, changed) = drift::detect(&options.data, &observed, &policy);
        if changed {
            tracing::info!(operation = "read", id = %record.id, "found differences in remote resource");
            record.config.data = reconciled.to_string();
        }
        Ok(())
    }

    /// Updates the remote resource.
    ///
    /// When provider-level `copy_keys` are configured, the current remote
    /// state is fetched first and those keys copied into the outgoing
    /// payload, so server-managed values survive the write.
    ///
    /// # Errors
    ///
    /// Any builder or transport failure aborts the operation.
    pub async fn update(&self, record: &mut ResourceRecord) -> Result<(), ResourceError> {
        let mut options =
            OperationOptions::build(&record.config, &self.settings, Some(&record.id))?;

        if !self.settings.copy_keys().is_empty() {
            let url = options.read_url()?;
            let observed = self.transport.read(&url, options.read_method).await?;
            if let Some(map) = options.data.as_object_mut() {
                for key in self.settings.copy_keys() {
                    if let Some(value) = observed.get(key) {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        let payload = options.update_data.clone().unwrap_or_else(|| options.data.clone());
        let url = options.update_url()?;

        if options.debug {
            tracing::debug!(
                operation = "update",
                path = %url,
                payload = %self.payload_display(&payload),
                "updating remote resource"
            );
        }

        self.transport
            .update(&url, options.update_method, &payload)
            .await?;
        Ok(())
    }

    /// Deletes the remote resource. A not-found answer from the transport
    /// counts as success: the object is gone either way.
    ///
    /// # Errors
    ///
    /// Any other transport failure is fatal.
    pub async fn delete(&self, record: &mut ResourceRecord) -> Result<(), ResourceError> {
        let options = OperationOptions::build(&record.config, &self.settings, Some(&record.id))?;
        let url = options.destroy_url()?;

        match self
            .transport
            .delete(&url, options.destroy_method, options.destroy_data.as_ref())
            .await
        {
            Ok(_) => {}
            Err(error) if error.is_not_found() => {
                tracing::warn!(
                    operation = "delete",
                    path = %url,
                    "remote resource already absent; treating delete as successful"
                );
            }
            Err(error) => return Err(error.into()),
        }

        record.id.clear();
        Ok(())
    }

    /// Adopts a pre-existing remote resource from its composite identifier.
    ///
    /// Synthesizes a minimal declared-state document containing only the
    /// identifier, forces verbose diagnostics on (troubleshooting a failed
    /// import is hard enough), and performs a read so the returned record
    /// holds the reconciled remote state.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidImportFormat`] for an identifier without a
    /// path separator, plus anything the read can fail with.
    pub async fn import(&self, composite_id: &str) -> Result<ResourceRecord, ResourceError> {
        let (path, id) = parse_import_id(composite_id)?;

        let config = ResourceConfig {
            path,
            data: json!({ "id": id }).to_string(),
            debug: true,
            ..ResourceConfig::default()
        };
        let mut record = ResourceRecord { id, config };

        tracing::debug!(
            operation = "import",
            id = %record.id,
            path = %record.config.path,
            "adopting existing remote resource"
        );

        self.read(&mut record).await?;
        Ok(record)
    }

    /// Resolves a search-based read: fetch the collection, locate the
    /// result array, pick the element whose search key matches.
    async fn search(
        &self,
        options: &OperationOptions,
        search: &ReadSearch,
    ) -> Result<Value, ResourceError> {
        let url = append_query(options.path.clone(), &search.query_string);
        let body = self.transport.read(&url, options.read_method).await?;

        let results = if search.results_key.is_empty() {
            &body
        } else {
            value_at(&body, &search.results_key).ok_or_else(|| {
                ResourceError::InvalidSearchResults {
                    key: search.results_key.clone(),
                }
            })?
        };
        let items = results
            .as_array()
            .ok_or_else(|| ResourceError::InvalidSearchResults {
                key: search.results_key.clone(),
            })?;

        items
            .iter()
            .find(|item| {
                lookup_attribute(item, &search.search_key)
                    .is_some_and(|found| found == search.search_value)
            })
            .cloned()
            .ok_or_else(|| ResourceError::SearchMiss {
                search_key: search.search_key.clone(),
                search_value: search.search_value.clone(),
            })
    }

    fn payload_display(&self, payload: &Value) -> String {
        if self.settings.redact_payloads() {
            "(redacted)".to_string()
        } else {
            payload.to_string()
        }
    }
}

/// Pulls the identifier out of a response body, falling back to the
/// identifier the options already resolved.
fn extract_id(body: &Value, options: &OperationOptions) -> Result<String, ResourceError> {
    lookup_attribute(body, &options.id_attribute)
        .or_else(|| (!options.id.is_empty()).then(|| options.id.clone()))
        .ok_or_else(|| ResourceError::IdNotFound {
            attribute: options.id_attribute.clone(),
        })
}

/// Builds the drift policy from resource configuration. The explicit
/// `drift_fields` document must parse; hiding a malformed one would
/// silently change comparison behavior.
fn drift_policy(config: &ResourceConfig) -> Result<DriftPolicy, ResourceError> {
    let scope = match config.drift_fields.as_deref() {
        Some(text) if !text.is_empty() => {
            Some(serde_json::from_str(text).map_err(ResourceError::DriftParseFailure)?)
        }
        _ => None,
    };
    Ok(DriftPolicy {
        ignore: config.ignore_changes_to.clone(),
        ignore_all: config.ignore_all_server_changes,
        scope,
        scope_from_declared: config.drift_fields_from_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpMethod, TransportError};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport double that replays canned responses and records calls.
    struct FakeTransport {
        responses: Mutex<VecDeque<Result<Value, TransportError>>>,
        calls: Mutex<Vec<(HttpMethod, String)>>,
    }

    impl FakeTransport {
        fn new(responses: Vec<Result<Value, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, method: HttpMethod, path: &str) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push((method, path.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra transport call")
        }

        fn calls(&self) -> Vec<(HttpMethod, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        async fn create(
            &self,
            path: &str,
            method: HttpMethod,
            _payload: &Value,
        ) -> Result<Value, TransportError> {
            self.next(method, path)
        }

        async fn read(&self, path: &str, method: HttpMethod) -> Result<Value, TransportError> {
            self.next(method, path)
        }

        async fn update(
            &self,
            path: &str,
            method: HttpMethod,
            _payload: &Value,
        ) -> Result<Value, TransportError> {
            self.next(method, path)
        }

        async fn delete(
            &self,
            path: &str,
            method: HttpMethod,
            _payload: Option<&Value>,
        ) -> Result<Value, TransportError> {
            self.next(method, path)
        }
    }

    fn not_found(path: &str) -> TransportError {
        TransportError::Response {
            code: 404,
            method: HttpMethod::Delete,
            path: path.to_string(),
            message: String::new(),
        }
    }

    fn widget_record(data: &str) -> ResourceRecord {
        ResourceRecord::new(ResourceConfig {
            path: "/widgets".to_string(),
            data: data.to_string(),
            ..ResourceConfig::default()
        })
    }

    #[tokio::test]
    async fn test_create_records_returned_identifier() {
        let transport = FakeTransport::new(vec![Ok(json!({"id": "42", "name": "a"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"name": "a"}"#);

        lifecycle.create(&mut record).await.unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(
            lifecycle.transport.calls(),
            vec![(HttpMethod::Post, "/widgets".to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_without_any_identifier_fails() {
        let transport = FakeTransport::new(vec![Ok(json!({"name": "a"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"name": "a"}"#);

        let err = lifecycle.create(&mut record).await.unwrap_err();
        assert!(matches!(err, ResourceError::IdNotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_overwrites_declared_state_on_drift() {
        let transport =
            FakeTransport::new(vec![Ok(json!({"id": "42", "name": "b", "meta": {"ts": 2}}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"id": "42", "name": "a", "meta": {"ts": 1}}"#);
        record.id = "42".to_string();
        record.config.ignore_changes_to = vec!["meta.ts".to_string()];

        lifecycle.read(&mut record).await.unwrap();

        let data: Value = serde_json::from_str(&record.config.data).unwrap();
        assert_eq!(data, json!({"id": "42", "name": "b", "meta": {"ts": 1}}));
    }

    #[tokio::test]
    async fn test_read_leaves_declared_state_alone_without_drift() {
        let declared = r#"{"id": "42", "name": "a"}"#;
        let transport = FakeTransport::new(vec![Ok(json!({"id": "42", "name": "a"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(declared);
        record.id = "42".to_string();

        lifecycle.read(&mut record).await.unwrap();
        // Untouched, byte for byte.
        assert_eq!(record.config.data, declared);
    }

    #[tokio::test]
    async fn test_read_with_ignore_all_never_touches_declared_state() {
        let declared = r#"{"id": "42", "name": "a"}"#;
        let transport = FakeTransport::new(vec![Ok(json!({"id": "42", "name": "b"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(declared);
        record.id = "42".to_string();
        record.config.ignore_all_server_changes = true;

        lifecycle.read(&mut record).await.unwrap();
        assert_eq!(record.config.data, declared);
    }

    #[tokio::test]
    async fn test_read_tolerates_corrupt_declared_state() {
        let transport = FakeTransport::new(vec![Ok(json!({"id": "42", "name": "b"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record("{corrupt");
        record.id = "42".to_string();

        lifecycle.read(&mut record).await.unwrap();
        // The read proceeded and reconciled against an empty document.
        let data: Value = serde_json::from_str(&record.config.data).unwrap();
        assert_eq!(data, json!({"id": "42", "name": "b"}));
    }

    #[tokio::test]
    async fn test_read_fails_on_malformed_drift_fields() {
        let transport = FakeTransport::new(vec![Ok(json!({"id": "42"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"id": "42"}"#);
        record.id = "42".to_string();
        record.config.drift_fields = Some("{broken".to_string());

        let err = lifecycle.read(&mut record).await.unwrap_err();
        assert!(matches!(err, ResourceError::DriftParseFailure(_)));
    }

    #[tokio::test]
    async fn test_search_read_selects_matching_element() {
        let body = json!({"items": [
            {"id": "1", "name": "other"},
            {"id": "7", "name": "widget-7"}
        ]});
        let transport = FakeTransport::new(vec![Ok(body)]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());

        let mut record = widget_record(r#"{"name": "widget-7"}"#);
        record.config.read_search.insert("search_key".to_string(), json!("name"));
        record
            .config
            .read_search
            .insert("search_value".to_string(), json!("widget-7"));
        record
            .config
            .read_search
            .insert("results_key".to_string(), json!("items"));
        record
            .config
            .read_search
            .insert("query_string".to_string(), json!("limit=100"));

        lifecycle.read(&mut record).await.unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(
            lifecycle.transport.calls(),
            vec![(HttpMethod::Get, "/widgets?limit=100".to_string())]
        );
    }

    #[tokio::test]
    async fn test_search_read_without_match_fails() {
        let transport = FakeTransport::new(vec![Ok(json!({"items": []}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());

        let mut record = widget_record("{}");
        record.config.read_search.insert("search_key".to_string(), json!("name"));
        record
            .config
            .read_search
            .insert("search_value".to_string(), json!("nope"));
        record
            .config
            .read_search
            .insert("results_key".to_string(), json!("items"));

        let err = lifecycle.read(&mut record).await.unwrap_err();
        assert!(matches!(err, ResourceError::SearchMiss { .. }));
    }

    #[tokio::test]
    async fn test_update_sends_update_data_when_configured() {
        let transport = FakeTransport::new(vec![Ok(json!({}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"id": "42", "name": "a"}"#);
        record.config.update_data = Some(r#"{"name": "patched"}"#.to_string());
        record.id = "42".to_string();

        lifecycle.update(&mut record).await.unwrap();
        assert_eq!(
            lifecycle.transport.calls(),
            vec![(HttpMethod::Put, "/widgets/42".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_with_copy_keys_reads_first() {
        let transport = FakeTransport::new(vec![
            Ok(json!({"id": "42", "etag": "server-etag"})),
            Ok(json!({})),
        ]);
        let settings = ProviderSettings::builder()
            .copy_keys(vec!["etag".to_string()])
            .build();
        let lifecycle = ResourceLifecycle::new(transport, settings);
        let mut record = widget_record(r#"{"id": "42", "name": "a"}"#);
        record.id = "42".to_string();

        lifecycle.update(&mut record).await.unwrap();
        assert_eq!(
            lifecycle.transport.calls(),
            vec![
                (HttpMethod::Get, "/widgets/42".to_string()),
                (HttpMethod::Put, "/widgets/42".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_treats_not_found_as_success() {
        let transport = FakeTransport::new(vec![Err(not_found("/widgets/42"))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"id": "42"}"#);
        record.id = "42".to_string();

        lifecycle.delete(&mut record).await.unwrap();
        assert!(record.id.is_empty());
    }

    #[tokio::test]
    async fn test_delete_propagates_other_failures() {
        let transport = FakeTransport::new(vec![Err(TransportError::Response {
            code: 500,
            method: HttpMethod::Delete,
            path: "/widgets/42".to_string(),
            message: String::new(),
        })]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());
        let mut record = widget_record(r#"{"id": "42"}"#);
        record.id = "42".to_string();

        let err = lifecycle.delete(&mut record).await.unwrap_err();
        assert!(matches!(err, ResourceError::Transport(_)));
        assert_eq!(record.id, "42");
    }

    #[tokio::test]
    async fn test_import_builds_record_from_composite_id() {
        let transport = FakeTransport::new(vec![Ok(json!({"id": "abc123", "name": "adopted"}))]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());

        let record = lifecycle.import("/things/abc123").await.unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.config.path, "/things");
        assert!(record.config.debug);

        let data: Value = serde_json::from_str(&record.config.data).unwrap();
        assert_eq!(data, json!({"id": "abc123", "name": "adopted"}));
        assert_eq!(
            lifecycle.transport.calls(),
            vec![(HttpMethod::Get, "/things/abc123".to_string())]
        );
    }

    #[tokio::test]
    async fn test_import_rejects_identifier_without_separator() {
        let transport = FakeTransport::new(vec![]);
        let lifecycle = ResourceLifecycle::new(transport, ProviderSettings::default());

        let err = lifecycle.import("novalidslash").await.unwrap_err();
        assert!(matches!(err, ResourceError::InvalidImportFormat(_)));
    }
}
