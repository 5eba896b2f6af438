//! Path template resolution.
//!
//! Every lifecycle operation addresses the remote resource through a path
//! template. The template is either an explicit per-operation override or a
//! default derived from the resource's base path, and the placeholder
//! literal `{id}` marks where the identifier goes. Substitution replaces
//! each occurrence exactly once and never recurses into the substituted
//! value.
//!
//! Pure string transforms; no network access.
//!
//! # Example
//!
//! ```rust
//! use apistate::resource::resolve_path;
//!
//! // Default template.
//! let path = resolve_path("/widgets/{id}", None, "42").unwrap();
//! assert_eq!(path, "/widgets/42");
//!
//! // An override template wins.
//! let path = resolve_path("/widgets/{id}", Some("/widgets/{id}/details"), "7").unwrap();
//! assert_eq!(path, "/widgets/7/details");
//! ```

use crate::resource::ResourceError;

/// The placeholder literal replaced by the resource identifier.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Selects a template and substitutes the identifier into it.
///
/// A non-empty `override_template` wins over `default_template`.
///
/// # Errors
///
/// Returns [`ResourceError::MissingIdentifier`] when the chosen template
/// contains `{id}` but `id` is empty.
pub fn resolve_path(
    default_template: &str,
    override_template: Option<&str>,
    id: &str,
) -> Result<String, ResourceError> {
    let template = match override_template {
        Some(t) if !t.is_empty() => t,
        _ => default_template,
    };
    substitute_id(template, id)
}

/// Replaces every `{id}` occurrence in `template` with `id`.
///
/// Substitution happens exactly once per occurrence; a substituted value
/// that itself contains `{id}` is left alone.
///
/// # Errors
///
/// Returns [`ResourceError::MissingIdentifier`] when the template contains
/// the placeholder but `id` is empty.
pub fn substitute_id(template: &str, id: &str) -> Result<String, ResourceError> {
    if !template.contains(ID_PLACEHOLDER) {
        return Ok(template.to_string());
    }
    if id.is_empty() {
        return Err(ResourceError::MissingIdentifier {
            template: template.to_string(),
        });
    }
    Ok(template.replace(ID_PLACEHOLDER, id))
}

/// Appends a query string to a resolved path, if one is configured.
#[must_use]
pub fn append_query(path: String, query_string: &str) -> String {
    if query_string.is_empty() {
        path
    } else {
        format!("{path}?{query_string}")
    }
}
