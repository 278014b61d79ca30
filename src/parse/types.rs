//! The process definition aggregate produced by the block parser.
//!
//! Everything here is plain data. Once built by `parse`, `from_canonical`
//! or `store::load` a definition is never patched in place; re-parse instead.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::Step;
use crate::store::Identity;

// =============================================================================
// TOP-LEVEL DEFINITION
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProcessDefinition {
    /// Set once the definition has been persisted.
    pub identity: Option<Identity>,
    /// Revision number, starting at 1.
    pub version: u32,
    /// Caller-supplied version label, never interpreted.
    pub ext_version: String,
    pub lang_code: String,
    pub lang_name: String,
    pub vocab_text: String,
    /// Raw source text as authored.
    pub text: String,
    pub created: Option<DateTime<Utc>>,
    pub created_by: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_by: String,
    pub config: Config,
    pub pipeline: Pipeline,
    pub paths: BTreeMap<String, Path>,
    pub handlers: BTreeMap<String, Handler>,
    /// Lines the parser could not place, kept for the validator.
    pub line_errors: Vec<LineError>,
}

impl Default for ProcessDefinition {
    fn default() -> Self {
        ProcessDefinition {
            identity: None,
            version: 1,
            ext_version: String::new(),
            lang_code: String::new(),
            lang_name: String::new(),
            vocab_text: String::new(),
            text: String::new(),
            created: None,
            created_by: String::new(),
            last_updated: None,
            last_updated_by: String::new(),
            config: Config::default(),
            pipeline: Pipeline::default(),
            paths: BTreeMap::new(),
            handlers: BTreeMap::new(),
            line_errors: Vec::new(),
        }
    }
}

impl ProcessDefinition {
    /// The process name from the `Name:` config line.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// True if the source text has nothing but whitespace in it.
    pub fn is_empty_source(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// =============================================================================
// CONFIG & PIPELINE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub name: String,
    pub start: Start,
    /// Label → service name.
    pub service_map: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Start {
    pub path: String,
    pub service: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// Variable name → declared type.
    pub entries: BTreeMap<String, DataType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Str,
    Int,
    Float,
    Bool,
    List,
    Dict,
}

impl DataType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "str" => Some(DataType::Str),
            "int" => Some(DataType::Int),
            "float" => Some(DataType::Float),
            "bool" => Some(DataType::Bool),
            "list" => Some(DataType::List),
            "dict" => Some(DataType::Dict),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Str => "str",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::List => "list",
            DataType::Dict => "dict",
        }
    }
}

// =============================================================================
// PATHS, HANDLERS, NODES
// =============================================================================

/// A named, ordered list of steps.
#[derive(Debug, Clone, Default)]
pub struct Path {
    pub name: String,
    pub nodes: Vec<NodeItem>,
}

/// Handlers share the shape of paths but are triggered by signals and are
/// never the target of a path reference.
pub type Handler = Path;

/// Captured placeholder values of one node line.
pub type NodeData = BTreeMap<String, DataValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Text(String),
    List(Vec<String>),
}

impl DataValue {
    /// The value as authored text; lists are joined back with `", "`.
    pub fn as_text(&self) -> String {
        match self {
            DataValue::Text(s) => s.clone(),
            DataValue::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.to_string())
    }
}

/// One step inside a path or handler.
#[derive(Debug, Clone)]
pub struct NodeItem {
    pub id: Uuid,
    /// Step-kind tag, a key of the node registry.
    pub node_name: String,
    pub data: NodeData,
    pub step: Step,
    /// The line this node was parsed from, empty when rebuilt from a text form.
    pub source_line: String,
}

impl NodeItem {
    pub fn new(
        node_name: impl Into<String>,
        data: NodeData,
        step: Step,
        source_line: impl Into<String>,
    ) -> Self {
        NodeItem {
            id: Uuid::new_v4(),
            node_name: node_name.into(),
            data,
            step,
            source_line: source_line.into(),
        }
    }
}

// =============================================================================
// LINE-LEVEL PROBLEMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineErrorKind {
    /// Matched no pattern, or opened an unknown block.
    Unparseable,
    /// Opened a path or handler whose name is already taken.
    DuplicateName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub kind: LineErrorKind,
    /// 1-based line number in the source text.
    pub line_no: usize,
    pub line: String,
}
