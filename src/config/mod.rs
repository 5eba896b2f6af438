//! Provider-level configuration.
//!
//! [`ProviderSettings`] carries the coarse-scoped defaults every resource
//! falls back to when it does not override a field itself: the HTTP method
//! per lifecycle operation, the attribute the remote API reports object
//! identifiers under, keys copied forward from remote state before updates,
//! and whether payload bodies are redacted in log output.
//!
//! Configuration is instance-based and passed explicitly; nothing in this
//! crate reads the process environment.
//!
//! # Example
//!
//! ```rust
//! use apistate::config::ProviderSettings;
//! use apistate::transport::HttpMethod;
//!
//! let settings = ProviderSettings::builder()
//!     .update_method(HttpMethod::Patch)
//!     .id_attribute("uuid")
//!     .build();
//!
//! assert_eq!(settings.update_method(), HttpMethod::Patch);
//! assert_eq!(settings.id_attribute(), "uuid");
//! // Unset fields keep their defaults.
//! assert_eq!(settings.create_method(), HttpMethod::Post);
//! ```

use crate::transport::HttpMethod;

/// Provider-scoped defaults consulted when a resource leaves a field unset.
///
/// # Thread Safety
///
/// `ProviderSettings` is `Clone`, `Send`, and `Sync`, making it safe to
/// share across threads and async tasks.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    create_method: HttpMethod,
    read_method: HttpMethod,
    update_method: HttpMethod,
    destroy_method: HttpMethod,
    id_attribute: String,
    copy_keys: Vec<String>,
    redact_payloads: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            create_method: HttpMethod::Post,
            read_method: HttpMethod::Get,
            update_method: HttpMethod::Put,
            destroy_method: HttpMethod::Delete,
            id_attribute: "id".to_string(),
            copy_keys: Vec::new(),
            redact_payloads: false,
        }
    }
}

impl ProviderSettings {
    /// Returns a builder with all fields at their defaults.
    #[must_use]
    pub fn builder() -> ProviderSettingsBuilder {
        ProviderSettingsBuilder::default()
    }

    /// Default method for create operations (POST unless overridden).
    #[must_use]
    pub const fn create_method(&self) -> HttpMethod {
        self.create_method
    }

    /// Default method for read operations (GET unless overridden).
    #[must_use]
    pub const fn read_method(&self) -> HttpMethod {
        self.read_method
    }

    /// Default method for update operations (PUT unless overridden).
    #[must_use]
    pub const fn update_method(&self) -> HttpMethod {
        self.update_method
    }

    /// Default method for destroy operations (DELETE unless overridden).
    #[must_use]
    pub const fn destroy_method(&self) -> HttpMethod {
        self.destroy_method
    }

    /// The attribute remote responses report object identifiers under.
    #[must_use]
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Keys whose remote values are copied into the payload before updates.
    ///
    /// Some APIs hand out server-generated fields on read that must be sent
    /// back verbatim on update.
    #[must_use]
    pub fn copy_keys(&self) -> &[String] {
        &self.copy_keys
    }

    /// Whether payload bodies are replaced with a placeholder in logs.
    #[must_use]
    pub const fn redact_payloads(&self) -> bool {
        self.redact_payloads
    }
}

/// Builder for [`ProviderSettings`].
#[derive(Debug, Default)]
pub struct ProviderSettingsBuilder {
    settings: ProviderSettings,
}

impl ProviderSettingsBuilder {
    /// Sets the default create method.
    #[must_use]
    pub fn create_method(mut self, method: HttpMethod) -> Self {
        self.settings.create_method = method;
        self
    }

    /// Sets the default read method.
    #[must_use]
    pub fn read_method(mut self, method: HttpMethod) -> Self {
        self.settings.read_method = method;
        self
    }

    /// Sets the default update method.
    #[must_use]
    pub fn update_method(mut self, method: HttpMethod) -> Self {
        self.settings.update_method = method;
        self
    }

    /// Sets the default destroy method.
    #[must_use]
    pub fn destroy_method(mut self, method: HttpMethod) -> Self {
        self.settings.destroy_method = method;
        self
    }

    /// Sets the default identifier attribute name.
    #[must_use]
    pub fn id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.settings.id_attribute = attribute.into();
        self
    }

    /// Sets the keys copied forward from remote state before updates.
    #[must_use]
    pub fn copy_keys(mut self, keys: Vec<String>) -> Self {
        self.settings.copy_keys = keys;
        self
    }

    /// Sets whether payload bodies are redacted in log output.
    #[must_use]
    pub fn redact_payloads(mut self, redact: bool) -> Self {
        self.settings.redact_payloads = redact;
        self
    }

    /// Finalizes the settings.
    #[must_use]
    pub fn build(self) -> ProviderSettings {
        self.settings
    }
}

// Verify ProviderSettings is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProviderSettings>();
};
