//! Vocabulary: the declarative grammar table of one surface language.
//!
//! A vocabulary is read from a small section-based text format:
//!
//! ```text
//! [main]
//! name      = English
//! code      = en_uk
//! top_level = Config, Path, Handler, Pipeline
//!
//! [path]
//! name      = Path: {name}
//! invoke    = Invoke {service}
//! ```
//!
//! Pattern order inside a section is significant: when a line could match
//! more than one pattern, the first one declared wins.

pub mod en_uk;
pub mod pattern;

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::ProcessError;
pub use pattern::{Captures, Matcher};

/// Kinds of top-level blocks a process text is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Config,
    Pipeline,
    Path,
    Handler,
}

impl BlockKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "config" => Some(BlockKind::Config),
            "pipeline" => Some(BlockKind::Pipeline),
            "path" => Some(BlockKind::Path),
            "handler" => Some(BlockKind::Handler),
            _ => None,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::Config => write!(f, "config"),
            BlockKind::Pipeline => write!(f, "pipeline"),
            BlockKind::Path => write!(f, "path"),
            BlockKind::Handler => write!(f, "handler"),
        }
    }
}

/// Patterns of a path or handler section.
#[derive(Debug, Clone)]
pub struct BlockPatterns {
    /// Extracts the block's own name from its header line.
    pub name: Matcher,
    /// Step-kind tag → pattern, in declared order.
    pub nodes: Vec<(String, Matcher)>,
}

/// An immutable, compiled vocabulary. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    code: String,
    name: String,
    text: String,
    top_level: Vec<String>,
    keywords: HashMap<String, BlockKind>,
    config: Vec<(String, Matcher)>,
    pipeline: Matcher,
    path: BlockPatterns,
    handler: BlockPatterns,
}

impl Vocabulary {
    /// Read and compile a vocabulary from its text form.
    pub fn load(text: &str) -> Result<Self, ProcessError> {
        let sections = read_sections(text)?;

        let main = section(&sections, "main")?;
        let name = required(main, "main", "name")?.to_string();
        let code = lookup(main, "code").unwrap_or_default().to_string();

        let top_level: Vec<String> = required(main, "main", "top_level")?
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        let mut keywords = HashMap::new();
        for keyword in &top_level {
            let Some(kind) = BlockKind::from_keyword(keyword) else {
                return Err(ProcessError::vocabulary(
                    "VOC-004",
                    format!("No block dispatcher for top-level keyword '{}'", keyword),
                ));
            };
            keywords.insert(keyword.to_lowercase(), kind);
        }

        let config = compile_all(section(&sections, "config")?)?;
        let pipeline = pattern::compile(required(
            section(&sections, "pipeline")?,
            "pipeline",
            "pattern",
        )?)?;
        let path = block_patterns(&sections, "path")?;
        let handler = block_patterns(&sections, "handler")?;

        debug!(
            language = %name,
            code = %code,
            path_patterns = path.nodes.len(),
            handler_patterns = handler.nodes.len(),
            "loaded vocabulary"
        );

        Ok(Vocabulary {
            code,
            name,
            text: text.to_string(),
            top_level,
            keywords,
            config,
            pipeline,
            path,
            handler,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text this vocabulary was loaded from.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn top_level(&self) -> &[String] {
        &self.top_level
    }

    /// Resolve the first token of a top-level line (colon already stripped).
    pub fn block_kind(&self, keyword: &str) -> Option<BlockKind> {
        self.keywords.get(&keyword.to_lowercase()).copied()
    }

    pub fn config_patterns(&self) -> &[(String, Matcher)] {
        &self.config
    }

    pub fn pipeline_pattern(&self) -> &Matcher {
        &self.pipeline
    }

    pub fn path_patterns(&self) -> &BlockPatterns {
        &self.path
    }

    pub fn handler_patterns(&self) -> &BlockPatterns {
        &self.handler
    }
}

/// A built-in vocabulary by language code, compiled once per process.
pub fn builtin(lang_code: &str) -> Result<&'static Vocabulary, ProcessError> {
    static EN_UK: OnceLock<Result<Vocabulary, String>> = OnceLock::new();

    let cell = match lang_code {
        en_uk::LANG_CODE => &EN_UK,
        other => {
            return Err(ProcessError::vocabulary(
                "VOC-008",
                format!("Unknown language code '{}'", other),
            ));
        }
    };

    cell.get_or_init(|| Vocabulary::load(en_uk::VOCABULARY).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| ProcessError::vocabulary("VOC-009", e.clone()))
}

// =============================================================================
// SECTION READER
// =============================================================================

type Section = Vec<(String, String)>;

fn read_sections(text: &str) -> Result<Vec<(String, Section)>, ProcessError> {
    let mut sections: Vec<(String, Section)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                return Err(malformed(idx, raw));
            };
            let name = name.trim().to_lowercase();
            if sections.iter().any(|(n, _)| *n == name) {
                return Err(ProcessError::vocabulary(
                    "VOC-001",
                    format!("Section [{}] declared twice (line {})", name, idx + 1),
                ));
            }
            sections.push((name, Vec::new()));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(malformed(idx, raw));
        };
        let Some((section_name, entries)) = sections.last_mut() else {
            return Err(ProcessError::vocabulary(
                "VOC-001",
                format!("Entry outside of any section (line {}): '{}'", idx + 1, raw),
            ));
        };
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(malformed(idx, raw));
        }
        if entries.iter().any(|(k, _)| *k == key) {
            return Err(ProcessError::vocabulary(
                "VOC-001",
                format!("Key '{}' declared twice in [{}]", key, section_name),
            ));
        }
        entries.push((key, value.trim().to_string()));
    }

    for (name, _) in &sections {
        if !matches!(
            name.as_str(),
            "main" | "config" | "pipeline" | "path" | "handler"
        ) {
            return Err(ProcessError::vocabulary(
                "VOC-001",
                format!("Unknown section [{}]", name),
            ));
        }
    }

    Ok(sections)
}

fn malformed(idx: usize, raw: &str) -> ProcessError {
    ProcessError::vocabulary(
        "VOC-001",
        format!("Malformed vocabulary line {}: '{}'", idx + 1, raw),
    )
}

fn section<'a>(
    sections: &'a [(String, Section)],
    name: &str,
) -> Result<&'a Section, ProcessError> {
    sections
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, s)| s)
        .ok_or_else(|| {
            ProcessError::vocabulary("VOC-002", format!("Missing section [{}]", name))
        })
}

fn lookup<'a>(section: &'a Section, key: &str) -> Option<&'a str> {
    section
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn required<'a>(section: &'a Section, name: &str, key: &str) -> Result<&'a str, ProcessError> {
    lookup(section, key).ok_or_else(|| {
        ProcessError::vocabulary(
            "VOC-002",
            format!("Missing key '{}' in section [{}]", key, name),
        )
    })
}

fn compile_all(section: &Section) -> Result<Vec<(String, Matcher)>, ProcessError> {
    section
        .iter()
        .map(|(tag, pattern)| Ok((tag.clone(), pattern::compile(pattern)?)))
        .collect()
}

fn block_patterns(
    sections: &[(String, Section)],
    name: &str,
) -> Result<BlockPatterns, ProcessError> {
    let entries = section(sections, name)?;
    let header = pattern::compile(required(entries, name, "name")?)?;
    if !header.has_field("name") {
        return Err(ProcessError::vocabulary(
            "VOC-007",
            format!(
                "The [{}] name pattern '{}' must capture {{name}}",
                name,
                header.source()
            ),
        ));
    }

    let nodes = entries
        .iter()
        .filter(|(tag, _)| tag != "name")
        .map(|(tag, pattern)| Ok((tag.clone(), pattern::compile(pattern)?)))
        .collect::<Result<Vec<_>, ProcessError>>()?;

    Ok(BlockPatterns {
        name: header,
        nodes,
    })
}
