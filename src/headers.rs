//! Header templates scoped to a collection.
//!
//! A request that names a collection may pick up headers defined for that
//! collection. Request-supplied headers always win on the same key.

use std::collections::HashMap;
use thiserror::Error;

/// Errors reported by a header-template collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderMergeError {
    /// No templates exist for the collection.
    #[error("no header templates for collection {0}")]
    UnknownScope(String),

    /// The template source could not be consulted.
    #[error("header templates unavailable: {0}")]
    Unavailable(String),
}

/// Supplies collection-scoped header templates.
pub trait HeaderTemplates: Send + Sync {
    /// Returns `request_headers` merged over the templates for `scope_id`.
    fn merge_headers(
        &self,
        scope_id: &str,
        request_headers: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>, HeaderMergeError>;
}

/// Overlays `overrides` on `base`; keys in `overrides` win.
pub fn overlay_headers(
    base: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// In-memory header templates keyed by collection id.
#[derive(Debug, Clone, Default)]
pub struct HeaderTemplateSet {
    templates: HashMap<String, HashMap<String, String>>,
}

impl HeaderTemplateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or extends) the templates of a collection.
    pub fn insert(&mut self, scope_id: impl Into<String>, headers: HashMap<String, String>) {
        self.templates
            .entry(scope_id.into())
            .or_default()
            .extend(headers);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_templates(
        mut self,
        scope_id: impl Into<String>,
        headers: HashMap<String, String>,
    ) -> Self {
        self.insert(scope_id, headers);
        self
    }
}

impl HeaderTemplates for HeaderTemplateSet {
    fn merge_headers(
        &self,
        scope_id: &str,
        request_headers: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>, HeaderMergeError> {
        let template = self
            .templates
            .get(scope_id)
            .ok_or_else(|| HeaderMergeError::UnknownScope(scope_id.to_string()))?;
        Ok(overlay_headers(template, request_headers))
    }
}
