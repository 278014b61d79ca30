//! Canonical tree types.
//!
//! Two container kinds carry the ordering rules directly in the type:
//! `SortedMap` for collections whose declaration order is irrelevant, and
//! `OrderedList` for sequences whose order is semantic. Serializers need no
//! per-type hooks to produce a deterministic output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parse::types::{DataType, DataValue, Start};

// =============================================================================
// CONTAINERS
// =============================================================================

/// Order-independent collection keyed by name, always iterated by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortedMap<V>(BTreeMap<String, V>);

impl<V> SortedMap<V> {
    pub fn new() -> Self {
        SortedMap(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for SortedMap<V> {
    fn default() -> Self {
        SortedMap::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for SortedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SortedMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Sequence whose order is part of its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedList<T>(Vec<T>);

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        OrderedList(Vec::new())
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        OrderedList::new()
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        OrderedList(iter.into_iter().collect())
    }
}

// =============================================================================
// TREE
// =============================================================================

/// Order-normalized projection of a `ProcessDefinition`.
///
/// Equality of two definitions is equality of their trees, excluding `_meta`
/// (see `content_eq`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTree {
    pub config: CanonicalConfig,
    #[serde(default)]
    pub pipeline: SortedMap<DataType>,
    #[serde(default)]
    pub path: SortedMap<OrderedList<NodeRecord>>,
    #[serde(default)]
    pub handler: SortedMap<OrderedList<NodeRecord>>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl CanonicalTree {
    /// Semantic equality: everything except `_meta`.
    pub fn content_eq(&self, other: &CanonicalTree) -> bool {
        self.config == other.config
            && self.pipeline == other.pipeline
            && self.path == other.path
            && self.handler == other.handler
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalConfig {
    pub start: Start,
    pub service_map: SortedMap<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_name: String,
    pub data: SortedMap<DataValue>,
}

/// Provenance and administrative labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub name: String,
    pub ext_version: String,
    pub version: u32,
    pub lang_code: String,
    pub lang_name: String,
    pub vocab_text: String,
    pub text: String,
    pub created: Option<DateTime<Utc>>,
    pub created_by: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_by: String,
}
