//! Parse phase: process text + vocabulary → `ProcessDefinition`.
//!
//! The parser never stops at the first authoring problem. Lines it cannot
//! place are recorded on the definition as `LineError`s and reported later
//! by the validator, so a user sees every problem in one pass. Only a broken
//! vocabulary fails the call.

pub mod block;
pub mod graph;
pub mod types;

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

pub use graph::PathGraph;
pub use types::*;

use crate::error::ProcessError;
use crate::step::NodeRegistry;
use crate::vocab::{self, BlockKind, BlockPatterns, Captures, Matcher, Vocabulary};
use block::{RawBlock, SourceLine};

/// Parse `text` with a vocabulary and the default node registry.
pub fn parse(text: &str, vocab: &Vocabulary) -> Result<ProcessDefinition, ProcessError> {
    Parser::new(vocab)?.parse(text)
}

/// Parse `text` with one of the built-in vocabularies.
pub fn parse_builtin(text: &str, lang_code: &str) -> Result<ProcessDefinition, ProcessError> {
    builtin_parser(lang_code)?.parse(text)
}

/// Parser bound to a built-in vocabulary, bound once per process.
pub fn builtin_parser(lang_code: &str) -> Result<&'static Parser<'static>, ProcessError> {
    static EN_UK: OnceLock<Result<Parser<'static>, String>> = OnceLock::new();

    let vocab = vocab::builtin(lang_code)?;
    let cell = match lang_code {
        vocab::en_uk::LANG_CODE => &EN_UK,
        other => {
            return Err(ProcessError::vocabulary(
                "VOC-008",
                format!("Unknown language code '{}'", other),
            ));
        }
    };

    cell.get_or_init(|| Parser::new(vocab).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| ProcessError::vocabulary("VOC-009", e.clone()))
}

// =============================================================================
// CONFIG SETTERS
// =============================================================================

type ConfigSetter = fn(&mut Config, &Captures);

/// Config tag → (placeholders it needs, setter).
fn config_setters() -> HashMap<&'static str, (&'static [&'static str], ConfigSetter)> {
    let mut setters: HashMap<&'static str, (&'static [&'static str], ConfigSetter)> =
        HashMap::new();
    setters.insert("name", (&["name"], set_name));
    setters.insert("start", (&["path", "service"], set_start));
    setters.insert("service_map", (&["service", "label"], set_service_map));
    setters
}

fn set_name(config: &mut Config, caps: &Captures) {
    config.name = capture(caps, "name");
}

fn set_start(config: &mut Config, caps: &Captures) {
    config.start.path = capture(caps, "path");
    config.start.service = capture(caps, "service");
}

fn set_service_map(config: &mut Config, caps: &Captures) {
    config
        .service_map
        .insert(capture(caps, "label"), capture(caps, "service"));
}

fn capture(caps: &Captures, name: &str) -> String {
    caps.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

// =============================================================================
// PARSER
// =============================================================================

/// A vocabulary bound to its dispatch tables.
///
/// Binding checks that every tag the vocabulary uses has a handler and that
/// each pattern captures the fields its handler needs.
pub struct Parser<'v> {
    vocab: &'v Vocabulary,
    registry: NodeRegistry,
    config: Vec<(ConfigSetter, &'v Matcher)>,
}

impl<'v> Parser<'v> {
    pub fn new(vocab: &'v Vocabulary) -> Result<Self, ProcessError> {
        Self::with_registry(vocab, NodeRegistry::default())
    }

    pub fn with_registry(
        vocab: &'v Vocabulary,
        registry: NodeRegistry,
    ) -> Result<Self, ProcessError> {
        let setters = config_setters();
        let mut config = Vec::new();
        for (tag, matcher) in vocab.config_patterns() {
            let Some((fields, setter)) = setters.get(tag.as_str()) else {
                return Err(ProcessError::vocabulary(
                    "VOC-006",
                    format!("No config handler for '{}'", tag),
                ));
            };
            require_fields(tag, matcher, fields)?;
            config.push((*setter, matcher));
        }

        require_fields("pipeline", vocab.pipeline_pattern(), &["name", "data_type"])?;

        for patterns in [vocab.path_patterns(), vocab.handler_patterns()] {
            for (tag, matcher) in &patterns.nodes {
                let Some(entry) = registry.get(tag) else {
                    return Err(ProcessError::vocabulary(
                        "VOC-005",
                        format!("Unknown node type '{}'", tag),
                    ));
                };
                require_fields(tag, matcher, entry.fields)?;
            }
        }

        Ok(Parser {
            vocab,
            registry,
            config,
        })
    }

    pub fn parse(&self, text: &str) -> Result<ProcessDefinition, ProcessError> {
        let mut pd = ProcessDefinition {
            lang_code: self.vocab.code().to_string(),
            lang_name: self.vocab.name().to_string(),
            vocab_text: self.vocab.text().to_string(),
            text: text.to_string(),
            ..Default::default()
        };

        let split = block::split_blocks(text);
        for line in &split.orphans {
            unparseable(&mut pd, line);
        }

        for raw in &split.blocks {
            match self.vocab.block_kind(&raw.keyword) {
                Some(BlockKind::Config) => self.parse_config(raw, &mut pd),
                Some(BlockKind::Pipeline) => self.parse_pipeline(raw, &mut pd),
                Some(kind @ (BlockKind::Path | BlockKind::Handler)) => {
                    self.parse_nodes(raw, kind, &mut pd)?
                }
                None => unparseable(&mut pd, &raw.header),
            }
        }

        debug!(
            name = %pd.config.name,
            paths = pd.paths.len(),
            handlers = pd.handlers.len(),
            line_errors = pd.line_errors.len(),
            "parsed process definition"
        );

        Ok(pd)
    }

    fn parse_config(&self, raw: &RawBlock<'_>, pd: &mut ProcessDefinition) {
        for line in &raw.body {
            let matched = self
                .config
                .iter()
                .find_map(|(setter, m)| m.captures(line.text()).map(|caps| (setter, caps)));
            match matched {
                Some((setter, caps)) => setter(&mut pd.config, &caps),
                None => unparseable(pd, line),
            }
        }
    }

    fn parse_pipeline(&self, raw: &RawBlock<'_>, pd: &mut ProcessDefinition) {
        for line in &raw.body {
            let entry = self
                .vocab
                .pipeline_pattern()
                .captures(line.text())
                .and_then(|caps| {
                    let data_type = DataType::from_tag(&capture(&caps, "data_type"))?;
                    Some((capture(&caps, "name"), data_type))
                });
            match entry {
                Some((name, data_type)) => {
                    pd.pipeline.entries.insert(name, data_type);
                }
                None => unparseable(pd, line),
            }
        }
    }

    fn parse_nodes(
        &self,
        raw: &RawBlock<'_>,
        kind: BlockKind,
        pd: &mut ProcessDefinition,
    ) -> Result<(), ProcessError> {
        let patterns: &BlockPatterns = match kind {
            BlockKind::Handler => self.vocab.handler_patterns(),
            _ => self.vocab.path_patterns(),
        };

        let Some(header) = patterns.name.captures(raw.header.text()) else {
            unparseable(pd, &raw.header);
            return Ok(());
        };
        let name = capture(&header, "name");

        let taken = match kind {
            BlockKind::Handler => pd.handlers.contains_key(&name),
            _ => pd.paths.contains_key(&name),
        };
        if taken {
            pd.line_errors.push(LineError {
                kind: LineErrorKind::DuplicateName,
                line_no: raw.header.number,
                line: raw.header.text().to_string(),
            });
            return Ok(());
        }

        let mut block = Path {
            name: name.clone(),
            nodes: Vec::new(),
        };

        for line in &raw.body {
            let matched = patterns
                .nodes
                .iter()
                .find_map(|(tag, m)| m.captures(line.text()).map(|caps| (tag, caps)));
            let Some((tag, caps)) = matched else {
                unparseable(pd, line);
                continue;
            };

            let data: NodeData = caps
                .into_iter()
                .map(|(k, v)| (k, DataValue::Text(v.trim().to_string())))
                .collect();
            let step = self
                .registry
                .construct(tag, &data)
                .map_err(|e| ProcessError::parse("PAR-001", e))?;
            block.nodes.push(NodeItem::new(tag.as_str(), data, step, line.text()));
        }

        match kind {
            BlockKind::Handler => pd.handlers.insert(name, block),
            _ => pd.paths.insert(name, block),
        };
        Ok(())
    }
}

fn require_fields(tag: &str, matcher: &Matcher, fields: &[&str]) -> Result<(), ProcessError> {
    match fields.iter().find(|f| !matcher.has_field(f)) {
        Some(missing) => Err(ProcessError::vocabulary(
            "VOC-007",
            format!(
                "Pattern '{}' for '{}' must capture {{{}}}",
                matcher.source(),
                tag,
                missing
            ),
        )),
        None => Ok(()),
    }
}

fn unparseable(pd: &mut ProcessDefinition, line: &SourceLine<'_>) {
    pd.line_errors.push(LineError {
        kind: LineErrorKind::Unparseable,
        line_no: line.number,
        line: line.text().to_string(),
    });
}
