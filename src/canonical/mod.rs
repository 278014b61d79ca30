//! Canonical form: deterministic projection of a definition and back.
//!
//! Node records are copied verbatim from `NodeItem` state rather than
//! re-derived from the constructed step, so canonicalization does not
//! depend on step-kind internals. Going back, steps are rebuilt through
//! the node registry.

pub mod text;
pub mod types;

pub use text::{from_text, to_text};
pub use types::*;

use std::collections::BTreeMap;

use crate::error::ProcessError;
use crate::parse::types::{Config, NodeItem, Path, Pipeline, ProcessDefinition};
use crate::step::NodeRegistry;

pub fn to_canonical(pd: &ProcessDefinition) -> CanonicalTree {
    CanonicalTree {
        config: CanonicalConfig {
            start: pd.config.start.clone(),
            service_map: pd
                .config
                .service_map
                .iter()
                .map(|(label, service)| (label.clone(), service.clone()))
                .collect(),
        },
        pipeline: pd
            .pipeline
            .entries
            .iter()
            .map(|(name, data_type)| (name.clone(), *data_type))
            .collect(),
        path: blocks_to_records(&pd.paths),
        handler: blocks_to_records(&pd.handlers),
        meta: Meta {
            name: pd.config.name.clone(),
            ext_version: pd.ext_version.clone(),
            version: pd.version,
            lang_code: pd.lang_code.clone(),
            lang_name: pd.lang_name.clone(),
            vocab_text: pd.vocab_text.clone(),
            text: pd.text.clone(),
            created: pd.created,
            created_by: pd.created_by.clone(),
            last_updated: pd.last_updated,
            last_updated_by: pd.last_updated_by.clone(),
        },
    }
}

/// Rebuild a definition from its canonical tree.
///
/// Node items get fresh ids and an empty source line; identity is left unset.
pub fn from_canonical(
    tree: &CanonicalTree,
    registry: &NodeRegistry,
) -> Result<ProcessDefinition, ProcessError> {
    let meta = &tree.meta;
    Ok(ProcessDefinition {
        identity: None,
        version: meta.version.max(1),
        ext_version: meta.ext_version.clone(),
        lang_code: meta.lang_code.clone(),
        lang_name: meta.lang_name.clone(),
        vocab_text: meta.vocab_text.clone(),
        text: meta.text.clone(),
        created: meta.created,
        created_by: meta.created_by.clone(),
        last_updated: meta.last_updated,
        last_updated_by: meta.last_updated_by.clone(),
        config: Config {
            name: meta.name.clone(),
            start: tree.config.start.clone(),
            service_map: tree
                .config
                .service_map
                .iter()
                .map(|(label, service)| (label.clone(), service.clone()))
                .collect(),
        },
        pipeline: Pipeline {
            entries: tree
                .pipeline
                .iter()
                .map(|(name, data_type)| (name.clone(), *data_type))
                .collect(),
        },
        paths: records_to_blocks(&tree.path, registry)?,
        handlers: records_to_blocks(&tree.handler, registry)?,
        line_errors: Vec::new(),
    })
}

fn blocks_to_records(blocks: &BTreeMap<String, Path>) -> SortedMap<OrderedList<NodeRecord>> {
    blocks
        .iter()
        .map(|(name, block)| {
            let records: OrderedList<NodeRecord> = block
                .nodes
                .iter()
                .map(|node| NodeRecord {
                    node_name: node.node_name.clone(),
                    data: node
                        .data
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                })
                .collect();
            (name.clone(), records)
        })
        .collect()
}

fn records_to_blocks(
    records: &SortedMap<OrderedList<NodeRecord>>,
    registry: &NodeRegistry,
) -> Result<BTreeMap<String, Path>, ProcessError> {
    let mut blocks = BTreeMap::new();
    for (name, list) in records.iter() {
        let mut nodes = Vec::with_capacity(list.len());
        for record in list.iter() {
            let data: BTreeMap<_, _> = record
                .data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let step = registry
                .construct(&record.node_name, &data)
                .map_err(|e| ProcessError::text_form("TXT-002", format!("In `{}`: {}", name, e)))?;
            nodes.push(NodeItem::new(record.node_name.as_str(), data, step, ""));
        }
        blocks.insert(
            name.clone(),
            Path {
                name: name.clone(),
                nodes,
            },
        );
    }
    Ok(blocks)
}

impl ProcessDefinition {
    pub fn to_canonical(&self) -> CanonicalTree {
        to_canonical(self)
    }

    pub fn from_canonical(tree: &CanonicalTree) -> Result<Self, ProcessError> {
        from_canonical(tree, &NodeRegistry::default())
    }

    pub fn to_text_form(&self) -> Result<String, ProcessError> {
        to_text(self)
    }

    pub fn from_text_form(text: &str) -> Result<Self, ProcessError> {
        from_text(text)
    }

    /// Structural equality of the canonical trees, `_meta` excluded.
    pub fn canonical_eq(&self, other: &ProcessDefinition) -> bool {
        to_canonical(self).content_eq(&to_canonical(other))
    }
}
