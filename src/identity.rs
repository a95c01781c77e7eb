//! Display-name resolution for participant identifiers.
//!
//! Names are presentation only. Stored identifiers and every projection
//! work on the raw ids.

use std::collections::HashMap;

/// Maps an opaque participant identifier to something a person can read.
pub trait NameResolver {
    fn resolve_name(&self, id: &str) -> String;
}

/// Shows identifiers as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawNames;

impl NameResolver for RawNames {
    fn resolve_name(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A fixed id -> display name table, falling back to the raw id.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    names: HashMap<String, String>,
}

impl NameDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the display name for `id`.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    /// Parses an `ID=NAME` pair. Returns `None` if either side is empty.
    pub fn parse_pair(pair: &str) -> Option<(String, String)> {
        let (id, name) = pair.split_once('=')?;
        let (id, name) = (id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return None;
        }
        Some((id.to_string(), name.to_string()))
    }
}

impl NameResolver for NameDirectory {
    fn resolve_name(&self, id: &str) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directory = NameDirectory::new();
        for (id, name) in iter {
            directory.insert(id, name);
        }
        directory
    }
}
