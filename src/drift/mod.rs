//! Drift detection between declared and observed state.
//!
//! [`detect`] compares the document an operator declared against the
//! document the remote API reported and produces a reconciled document plus
//! a flag saying whether anything in scope actually differed. Three
//! independent controls shape the comparison:
//!
//! - **ignore-all** ([`DriftPolicy::ignore_all`]): remote state never
//!   overrides declared state. Dominates everything else.
//! - **scope** ([`DriftPolicy::scope`] / [`DriftPolicy::scope_from_declared`]):
//!   only field paths present in the scope document are compared at all.
//! - **ignore-list** ([`DriftPolicy::ignore`]): dot-separated field paths
//!   excluded from comparison regardless of scope. Ignoring `metadata`
//!   covers `metadata.timestamp`; ignoring `metadata.timestamp` leaves
//!   `metadata.owner` in play.
//!
//! Ignored and out-of-scope fields keep their declared values verbatim.
//! In-scope, non-ignored fields take the observed value when it differs,
//! and fields the remote added are adopted into the reconciled document
//! unless scope rules exclude them.
//!
//! Maps compare order-insensitively, arrays order-sensitively. Inputs are
//! never mutated.
//!
//! # Example
//!
//! ```rust
//! use apistate::drift::{detect, DriftPolicy};
//! use serde_json::json;
//!
//! let declared = json!({"name": "a", "meta": {"ts": 1}});
//! let observed = json!({"name": "b", "meta": {"ts": 2}});
//!
//! let policy = DriftPolicy {
//!     ignore: vec!["meta.ts".to_string()],
//!     ..DriftPolicy::default()
//! };
//!
//! let (reconciled, changed) = detect(&declared, &observed, &policy);
//! assert!(changed);
//! assert_eq!(reconciled, json!({"name": "b", "meta": {"ts": 1}}));
//! ```

use serde_json::{Map, Value};

/// Rules controlling which fields participate in drift comparison.
#[derive(Debug, Clone, Default)]
pub struct DriftPolicy {
    /// Dot-separated field paths excluded from comparison. An entry also
    /// covers every path nested under it.
    pub ignore: Vec<String>,
    /// When true, remote changes are ignored wholesale and the declared
    /// document is returned untouched.
    pub ignore_all: bool,
    /// Optional document restricting comparison to the field paths present
    /// in it. Takes precedence over [`Self::scope_from_declared`].
    pub scope: Option<Value>,
    /// When true and no explicit scope document is set, the declared
    /// document itself is the comparison scope: only fields the operator
    /// declared are eligible, and remote-only fields are silently omitted.
    pub scope_from_declared: bool,
}

impl DriftPolicy {
    /// A policy that compares everything. `detect(x, x, &policy)` is a
    /// no-op for any well-formed document.
    #[must_use]
    pub fn compare_all() -> Self {
        Self::default()
    }
}

/// Computes the reconciled document and whether any in-scope field drifted.
///
/// Returns `(reconciled, changed)`. The reconciled document has the same
/// shape as `declared`, with non-ignored in-scope fields replaced by their
/// observed values where they differ. `changed` is true only when a field
/// that is eligible for comparison actually differed (including fields the
/// remote added or dropped).
#[must_use]
pub fn detect(declared: &Value, observed: &Value, policy: &DriftPolicy) -> (Value, bool) {
    if policy.ignore_all {
        return (declared.clone(), false);
    }

    // Explicit scope document wins over scope-from-declared.
    let scope = policy.scope.as_ref().map_or_else(
        || policy.scope_from_declared.then_some(declared),
        Some,
    );

    let mut changed = false;
    let reconciled = match (declared.as_object(), observed.as_object()) {
        (Some(declared_map), Some(observed_map)) => Value::Object(reconcile_map(
            declared_map,
            observed_map,
            "",
            &policy.ignore,
            scope,
            &mut changed,
        )),
        // Non-mapping roots degenerate to a plain equality check.
        _ => {
            if declared == observed {
                declared.clone()
            } else {
                changed = true;
                observed.clone()
            }
        }
    };

    (reconciled, changed)
}

fn reconcile_map(
    declared: &Map<String, Value>,
    observed: &Map<String, Value>,
    prefix: &str,
    ignore: &[String],
    scope: Option<&Value>,
    changed: &mut bool,
) -> Map<String, Value> {
    let scope_map = scope.and_then(Value::as_object);
    let mut out = Map::new();

    // Declared fields first, in declared order.
    for (key, declared_value) in declared {
        let path = join_path(prefix, key);
        let in_scope = scope_map.map_or(true, |s| s.contains_key(key));

        if !in_scope || is_ignored(&path, ignore) {
            out.insert(key.clone(), declared_value.clone());
            continue;
        }

        match observed.get(key) {
            // The remote dropped an eligible field.
            None => *changed = true,
            Some(observed_value) => {
                match (declared_value.as_object(), observed_value.as_object()) {
                    (Some(declared_nested), Some(observed_nested)) => {
                        // Descend so nested ignore entries and scope
                        // restrictions apply field by field.
                        let nested_scope = scope_map
                            .and_then(|s| s.get(key))
                            .filter(|v| v.is_object());
                        out.insert(
                            key.clone(),
                            Value::Object(reconcile_map(
                                declared_nested,
                                observed_nested,
                                &path,
                                ignore,
                                nested_scope,
                                changed,
                            )),
                        );
                    }
                    _ => {
                        if declared_value == observed_value {
                            out.insert(key.clone(), declared_value.clone());
                        } else {
                            *changed = true;
                            out.insert(key.clone(), observed_value.clone());
                        }
                    }
                }
            }
        }
    }

    // Fields only the remote knows about.
    for (key, observed_value) in observed {
        if declared.contains_key(key) {
            continue;
        }
        let path = join_path(prefix, key);
        let in_scope = scope_map.map_or(true, |s| s.contains_key(key));
        if !in_scope || is_ignored(&path, ignore) {
            continue;
        }
        *changed = true;
        out.insert(key.clone(), observed_value.clone());
    }

    out
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// An ignore entry matches a path exactly, or as a prefix at a dot boundary.
fn is_ignored(path: &str, ignore: &[String]) -> bool {
    ignore.iter().any(|entry| {
        path == entry
            || path
                .strip_prefix(entry.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}
