//! Tooltip registry.
//!
//! Maps `(namespace, topic id)` to the HTML fragment the documentation
//! pages show on hover. One namespace corresponds to one documented class
//! (e.g. `"SQFClass:Group"`); topic ids are assigned by the generator and
//! are only meaningful within their namespace.
//!
//! The registry is an explicit value: callers construct it, populate it
//! through [`TooltipRegistry::register`], and read it through
//! [`TooltipRegistry::lookup`]. Nothing here is process-global; the serve
//! path wraps a registry in an `ArcSwap` handle so a re-scan can replace
//! the whole thing atomically (see `serve::RegistryHandle`).
//!
//! Fragments are opaque payload. The registry never parses, validates or
//! sanitizes HTML; producing well-formed fragments is the generator's job.

use std::collections::BTreeMap;

use serde::Serialize;

/// Topic identifier assigned by the documentation generator.
///
/// Non-negative, unique within its namespace. Stability across
/// regenerations of the documentation is not guaranteed.
pub type TopicId = u32;

/// Tooltip entries of a single namespace, keyed by topic id.
///
/// `BTreeMap` keeps iteration and JSON export deterministic.
pub type TooltipSet = BTreeMap<TopicId, String>;

/// Store of tooltip fragments for a documentation tree.
///
/// Populated once per namespace at load time; effectively immutable
/// afterwards. Registering a namespace again replaces its entries
/// wholesale rather than merging (generation is single-shot per tree, so
/// a second registration means the namespace was re-emitted).
#[derive(Debug, Default, Clone, Serialize)]
pub struct TooltipRegistry {
    namespaces: BTreeMap<String, TooltipSet>,
}

impl TooltipRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace's entries, replacing any previous mapping.
    ///
    /// Returns the replaced entries when the namespace was already
    /// registered, so callers can report the collision.
    pub fn register(&mut self, namespace: impl Into<String>, entries: TooltipSet) -> Option<TooltipSet> {
        self.namespaces.insert(namespace.into(), entries)
    }

    /// Look up the fragment for `(namespace, id)`.
    ///
    /// Returns `None` when the namespace is unregistered or the id is
    /// absent from it. Callers recover locally (suppress the tooltip,
    /// answer 404); absence is never fatal here.
    pub fn lookup(&self, namespace: &str, id: TopicId) -> Option<&str> {
        self.namespaces.get(namespace)?.get(&id).map(String::as_str)
    }

    /// All entries of one namespace, if registered.
    pub fn entries(&self, namespace: &str) -> Option<&TooltipSet> {
        self.namespaces.get(namespace)
    }

    /// Registered namespaces in sorted order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Number of registered namespaces.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Total number of tooltip entries across all namespaces.
    pub fn entry_count(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    /// Check if the registry has any data.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
