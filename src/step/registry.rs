//! Node registry: step-kind tag → required fields + variant constructor.
//!
//! A vocabulary may only use tags registered here. `parse::Parser::new`
//! checks every tag of a vocabulary against the registry before any text
//! is parsed, so construction during parsing cannot meet an unknown tag.

use std::collections::HashMap;

use crate::parse::types::NodeData;

use super::Step;

/// Builds a step from captured node data. Fails with the missing field name.
pub type Constructor = fn(&NodeData) -> Result<Step, &'static str>;

#[derive(Debug, Clone, Copy)]
pub struct NodeEntry {
    pub tag: &'static str,
    /// Placeholders a pattern for this tag must capture.
    pub fields: &'static [&'static str],
    pub construct: Constructor,
}

#[derive(Debug, Clone)]
pub struct NodeRegistry {
    entries: HashMap<&'static str, NodeEntry>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        let mut registry = NodeRegistry {
            entries: HashMap::new(),
        };

        registry.register("require", &["path"], |d| {
            Ok(Step::Require { path: field(d, "path")? })
        });
        registry.register("require_else", &["path1", "path2"], |d| {
            Ok(Step::RequireElse {
                path1: field(d, "path1")?,
                path2: field(d, "path2")?,
            })
        });
        registry.register("enter", &["path"], |d| {
            Ok(Step::Enter { path: field(d, "path")? })
        });
        registry.register("fork_to", &["fork_to", "fork_name"], |d| {
            Ok(Step::ForkTo {
                fork_to: field(d, "fork_to")?,
                fork_name: field(d, "fork_name")?,
            })
        });
        registry.register("fork_to_and_wait", &["fork_to", "fork_name"], |d| {
            Ok(Step::ForkToAndWait {
                fork_to: field(d, "fork_to")?,
                fork_name: field(d, "fork_name")?,
            })
        });
        registry.register("if_enter", &["condition", "path"], |d| {
            Ok(Step::IfEnter {
                condition: field(d, "condition")?,
                path: field(d, "path")?,
            })
        });
        registry.register("else_enter", &["path"], |d| {
            Ok(Step::ElseEnter { path: field(d, "path")? })
        });
        registry.register("invoke", &["service"], |d| {
            Ok(Step::Invoke { service: field(d, "service")? })
        });
        registry.register("if_invoke", &["condition", "service"], |d| {
            Ok(Step::IfInvoke {
                condition: field(d, "condition")?,
                service: field(d, "service")?,
            })
        });
        registry.register("else_invoke", &["service"], |d| {
            Ok(Step::ElseInvoke { service: field(d, "service")? })
        });
        registry.register("wait_sig", &["signal"], |d| {
            Ok(Step::WaitSig { signal: field(d, "signal")? })
        });
        registry.register("wait_sig_enter", &["signal", "timeout", "path"], |d| {
            Ok(Step::WaitSigEnter {
                signal: field(d, "signal")?,
                timeout: field(d, "timeout")?,
                path: field(d, "path")?,
            })
        });
        registry.register("wait_sig_invoke", &["signal", "timeout", "service"], |d| {
            Ok(Step::WaitSigInvoke {
                signal: field(d, "signal")?,
                timeout: field(d, "timeout")?,
                service: field(d, "service")?,
            })
        });
        registry.register("wait_sigs", &["signals"], |d| {
            Ok(Step::WaitSigs { signals: field(d, "signals")? })
        });
        registry.register("wait_sigs_enter", &["signals", "timeout", "path"], |d| {
            Ok(Step::WaitSigsEnter {
                signals: field(d, "signals")?,
                timeout: field(d, "timeout")?,
                path: field(d, "path")?,
            })
        });
        registry.register("wait_sigs_invoke", &["signals", "timeout", "service"], |d| {
            Ok(Step::WaitSigsInvoke {
                signals: field(d, "signals")?,
                timeout: field(d, "timeout")?,
                service: field(d, "service")?,
            })
        });
        registry.register("ignore_signal", &["signal"], |d| {
            Ok(Step::IgnoreSignal { signal: field(d, "signal")? })
        });
        registry.register("ignore_signals", &["signals"], |d| {
            Ok(Step::IgnoreSignals { signals: field(d, "signals")? })
        });
        registry.register("emit", &["event"], |d| {
            Ok(Step::Emit { event: field(d, "event")? })
        });
        registry.register("set", &["key", "value"], |d| {
            Ok(Step::Set {
                key: field(d, "key")?,
                value: field(d, "value")?,
            })
        });

        registry
    }
}

impl NodeRegistry {
    fn register(
        &mut self,
        tag: &'static str,
        fields: &'static [&'static str],
        construct: Constructor,
    ) {
        self.entries.insert(
            tag,
            NodeEntry {
                tag,
                fields,
                construct,
            },
        );
    }

    pub fn get(&self, tag: &str) -> Option<&NodeEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Construct the step for `tag`. `Err` carries a human-readable reason.
    pub fn construct(&self, tag: &str, data: &NodeData) -> Result<Step, String> {
        let entry = self
            .get(tag)
            .ok_or_else(|| format!("Unknown node type '{}'", tag))?;
        (entry.construct)(data)
            .map_err(|missing| format!("Node type '{}' is missing field '{}'", tag, missing))
    }

    /// All registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.entries.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

fn field(data: &NodeData, name: &'static str) -> Result<String, &'static str> {
    data.get(name).map(|v| v.as_text()).ok_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::DataValue;

    fn data(pairs: &[(&str, &str)]) -> NodeData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), DataValue::from(*v)))
            .collect()
    }

    #[test]
    fn every_variant_round_trips_through_its_tag() {
        let registry = NodeRegistry::default();
        for tag in registry.tags() {
            let entry = registry.get(tag).unwrap();
            let d: NodeData = entry
                .fields
                .iter()
                .map(|f| (f.to_string(), DataValue::from("x")))
                .collect();
            let step = registry.construct(tag, &d).unwrap();
            assert_eq!(step.tag(), tag);
        }
        assert_eq!(registry.tags().len(), 20);
    }

    #[test]
    fn missing_field_is_reported() {
        let registry = NodeRegistry::default();
        let err = registry
            .construct("require_else", &data(&[("path1", "a")]))
            .unwrap_err();
        assert!(err.contains("path2"), "{}", err);
    }

    #[test]
    fn list_values_are_joined() {
        let registry = NodeRegistry::default();
        let mut d = NodeData::new();
        d.insert(
            "signals".into(),
            DataValue::List(vec!["a".into(), "b".into()]),
        );
        let step = registry.construct("wait_sigs", &d).unwrap();
        assert_eq!(step, Step::WaitSigs { signals: "a, b".into() });
    }

    #[test]
    fn unknown_tag() {
        let registry = NodeRegistry::default();
        assert!(!registry.contains("call"));
        assert!(registry.construct("call", &NodeData::new()).is_err());
    }
}
