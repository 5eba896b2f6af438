//! Composite identifier parsing for resource adoption.
//!
//! Adopting a pre-existing remote resource needs nothing more than its
//! addressable location: a slash-delimited string whose final segment is
//! the object identifier and whose remainder is the collection path.

use crate::resource::ResourceError;

/// Splits a composite import identifier into `(base_path, id)`.
///
/// One trailing slash is tolerated and stripped; the string is otherwise
/// taken as-is. The identifier is everything after the last remaining
/// slash, the base path everything before it.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidImportFormat`] when the input contains
/// no slash at all.
///
/// # Example
///
/// ```rust
/// use apistate::resource::parse_import_id;
///
/// let (path, id) = parse_import_id("/things/abc123").unwrap();
/// assert_eq!(path, "/things");
/// assert_eq!(id, "abc123");
/// ```
pub fn parse_import_id(raw: &str) -> Result<(String, String), ResourceError> {
    let trimmed = raw.strip_suffix('/').unwrap_or(raw);

    trimmed.rfind('/').map_or_else(
        || Err(ResourceError::InvalidImportFormat(raw.to_string())),
        |split| {
            Ok((
                trimmed[..split].to_string(),
                trimmed[split + 1..].to_string(),
            ))
        },
    )
}
