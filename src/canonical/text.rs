//! Text interchange format: the canonical tree as YAML.
//!
//! Top-level keys are always `config`, `pipeline`, `path`, `handler` and
//! `_meta`. Maps come out sorted and node lists in source order, so two
//! equal definitions serialize to identical, diffable text.

use tracing::debug;

use crate::error::ProcessError;
use crate::parse::types::ProcessDefinition;
use crate::step::NodeRegistry;

use super::{from_canonical, to_canonical, CanonicalTree};

pub fn to_text(pd: &ProcessDefinition) -> Result<String, ProcessError> {
    tree_to_text(&to_canonical(pd))
}

pub fn from_text(text: &str) -> Result<ProcessDefinition, ProcessError> {
    let tree = text_to_tree(text)?;
    debug!(
        paths = tree.path.len(),
        handlers = tree.handler.len(),
        "decoded text form"
    );
    from_canonical(&tree, &NodeRegistry::default())
}

pub fn tree_to_text(tree: &CanonicalTree) -> Result<String, ProcessError> {
    Ok(serde_yaml::to_string(tree)?)
}

pub fn text_to_tree(text: &str) -> Result<CanonicalTree, ProcessError> {
    Ok(serde_yaml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_builtin;

    const TEXT: &str = "Config:\n  Name: p\n  Start: a from svc\nPath: a\n  Invoke x\n";

    #[test]
    fn top_level_keys_in_fixed_order() {
        let pd = parse_builtin(TEXT, "en_uk").unwrap();
        let yaml = to_text(&pd).unwrap();
        let positions: Vec<usize> = ["config:", "pipeline:", "path:", "handler:", "_meta:"]
            .iter()
            .map(|key| yaml.find(&format!("\n{}", key)).unwrap_or(0))
            .collect();
        assert!(yaml.starts_with("config:"), "{}", yaml);
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", yaml);
    }

    #[test]
    fn unknown_node_name_is_a_text_form_error() {
        let pd = parse_builtin(TEXT, "en_uk").unwrap();
        let yaml = to_text(&pd).unwrap().replace("node_name: invoke", "node_name: call");
        let err = from_text(&yaml).unwrap_err();
        assert_eq!(err.code(), "TXT-002");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = from_text("config: [1, 2").unwrap_err();
        assert_eq!(err.code(), "TXT-001");
    }
}
