//! Named filter criteria for remote queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter values keyed by filter name.
///
/// A missing entry means "no constraint". Blank values are never stored, so
/// setting a filter to `""` is the same as clearing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    values: BTreeMap<String, String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterCriteria::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set or clear one filter. Returns whether the criteria changed.
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) -> bool {
        let name = name.into();
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(value) => self.values.insert(name, value.clone()).as_deref() != Some(value.as_str()),
            None => self.values.remove(&name).is_some(),
        }
    }

    /// Remove every constraint. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.values.is_empty();
        self.values.clear();
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
