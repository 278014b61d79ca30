//! Relational form of a definition: one header row plus child rows.
//!
//! Node data is kept as a JSON column so a row layout does not depend on
//! the fields of any particular step kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalConfig, CanonicalTree, Meta, NodeRecord, OrderedList, SortedMap};
use crate::error::ProcessError;
use crate::parse::types::{DataType, DataValue, Start};

use super::{Identity, Scope, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRow {
    pub identity: Option<Identity>,
    pub scope: Scope,
    pub name: String,
    pub version: u32,
    pub ext_version: String,
    pub lang_code: String,
    pub lang_name: String,
    pub vocab_text: String,
    pub text: String,
    pub start_path: String,
    pub start_service: String,
    pub created: Option<DateTime<Utc>>,
    pub created_by: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_by: String,
    pub service_map: Vec<ServiceMapRow>,
    pub pipeline: Vec<PipelineRow>,
    pub blocks: Vec<BlockRow>,
    pub nodes: Vec<NodeRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMapRow {
    pub label: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRow {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKindColumn {
    Path,
    Handler,
}

/// Declares a path or handler, so that empty ones survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    pub kind: BlockKindColumn,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    pub kind: BlockKindColumn,
    pub block_name: String,
    /// 0-based position inside the block.
    pub position: u32,
    pub node_name: String,
    /// JSON object of captured fields.
    pub data: String,
}

pub fn to_row(tree: &CanonicalTree, scope: &Scope) -> Result<DefinitionRow, ProcessError> {
    let meta = &tree.meta;
    let mut blocks = Vec::new();
    let mut nodes = Vec::new();

    for (kind, map) in [
        (BlockKindColumn::Path, &tree.path),
        (BlockKindColumn::Handler, &tree.handler),
    ] {
        for (name, records) in map.iter() {
            blocks.push(BlockRow {
                kind,
                name: name.clone(),
            });
            for (position, record) in records.iter().enumerate() {
                let data = serde_json::to_string(&record.data).map_err(|e| {
                    ProcessError::from(StoreError::Corrupt(format!(
                        "Could not encode node data of `{}`: {}",
                        name, e
                    )))
                })?;
                nodes.push(NodeRow {
                    kind,
                    block_name: name.clone(),
                    position: position as u32,
                    node_name: record.node_name.clone(),
                    data,
                });
            }
        }
    }

    Ok(DefinitionRow {
        identity: None,
        scope: scope.clone(),
        name: meta.name.clone(),
        version: meta.version,
        ext_version: meta.ext_version.clone(),
        lang_code: meta.lang_code.clone(),
        lang_name: meta.lang_name.clone(),
        vocab_text: meta.vocab_text.clone(),
        text: meta.text.clone(),
        start_path: tree.config.start.path.clone(),
        start_service: tree.config.start.service.clone(),
        created: meta.created,
        created_by: meta.created_by.clone(),
        last_updated: meta.last_updated,
        last_updated_by: meta.last_updated_by.clone(),
        service_map: tree
            .config
            .service_map
            .iter()
            .map(|(label, service)| ServiceMapRow {
                label: label.clone(),
                service: service.clone(),
            })
            .collect(),
        pipeline: tree
            .pipeline
            .iter()
            .map(|(name, data_type)| PipelineRow {
                name: name.clone(),
                data_type: *data_type,
            })
            .collect(),
        blocks,
        nodes,
    })
}

pub fn from_row(row: &DefinitionRow) -> Result<CanonicalTree, StoreError> {
    let mut path: SortedMap<OrderedList<NodeRecord>> = SortedMap::new();
    let mut handler: SortedMap<OrderedList<NodeRecord>> = SortedMap::new();

    for block in &row.blocks {
        let target = match block.kind {
            BlockKindColumn::Path => &mut path,
            BlockKindColumn::Handler => &mut handler,
        };

        let mut members: Vec<&NodeRow> = row
            .nodes
            .iter()
            .filter(|n| n.kind == block.kind && n.block_name == block.name)
            .collect();
        members.sort_by_key(|n| n.position);

        let mut records = OrderedList::new();
        for node in members {
            let data: SortedMap<DataValue> = serde_json::from_str(&node.data).map_err(|e| {
                StoreError::Corrupt(format!(
                    "Bad node data at `{}`#{}: {}",
                    node.block_name, node.position, e
                ))
            })?;
            records.push(NodeRecord {
                node_name: node.node_name.clone(),
                data,
            });
        }
        target.insert(block.name.clone(), records);
    }

    Ok(CanonicalTree {
        config: CanonicalConfig {
            start: Start {
                path: row.start_path.clone(),
                service: row.start_service.clone(),
            },
            service_map: row
                .service_map
                .iter()
                .map(|r| (r.label.clone(), r.service.clone()))
                .collect(),
        },
        pipeline: row
            .pipeline
            .iter()
            .map(|r| (r.name.clone(), r.data_type))
            .collect(),
        path,
        handler,
        meta: Meta {
            name: row.name.clone(),
            ext_version: row.ext_version.clone(),
            version: row.version,
            lang_code: row.lang_code.clone(),
            lang_name: row.lang_name.clone(),
            vocab_text: row.vocab_text.clone(),
            text: row.text.clone(),
            created: row.created,
            created_by: row.created_by.clone(),
            last_updated: row.last_updated,
            last_updated_by: row.last_updated_by.clone(),
        },
    })
}
