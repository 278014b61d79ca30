//! Individual validation rules, EPROC-0001 to EPROC-0010 and WPROC-0001.

use crate::parse::graph::PathGraph;
use crate::parse::types::{LineErrorKind, NodeItem, ProcessDefinition};

use super::*;

/// Units a timeout expression may end with.
const TIMEOUT_UNITS: [char; 4] = ['s', 'm', 'h', 'd'];

pub fn name_required(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    if pd.config.name.trim().is_empty() {
        errors.push(Diagnostic::new(NAME_REQUIRED, "Process name must not be empty"));
    }
}

pub fn start_complete(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    let start = &pd.config.start;
    if start.path.trim().is_empty() || start.service.trim().is_empty() {
        errors.push(Diagnostic::new(
            START_INCOMPLETE,
            "Start path and start service must both be provided",
        ));
    }
}

pub fn at_least_one_path(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    if pd.paths.is_empty() {
        errors.push(Diagnostic::new(
            NO_PATHS,
            "Process must contain at least one path",
        ));
    }
}

pub fn no_empty_paths(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    let empty: Vec<&str> = pd
        .paths
        .values()
        .filter(|p| p.nodes.is_empty())
        .map(|p| p.name.as_str())
        .collect();
    if !empty.is_empty() {
        errors.push(Diagnostic::new(
            EMPTY_PATHS,
            format!("Paths must not be empty: {}", empty.join(", ")),
        ));
    }
}

pub fn path_refs_exist(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    let start = pd.config.start.path.trim();
    if !start.is_empty() && !pd.paths.contains_key(start) {
        errors.push(Diagnostic::new(
            DANGLING_PATH_REF,
            format!("Start path `{}` does not exist", start),
        ));
    }

    for node in all_nodes(pd) {
        for target in node.step.path_refs() {
            if !pd.paths.contains_key(target) {
                errors.push(Diagnostic::new(
                    DANGLING_PATH_REF,
                    format!(
                        "Path `{}` does not exist (line: `{}`)",
                        target, node.source_line
                    ),
                ));
            }
        }
    }
}

pub fn timeout_units(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    for node in all_nodes(pd) {
        let Some(timeout) = node.step.timeout() else {
            continue;
        };
        let timeout = timeout.trim();
        let valid = timeout
            .chars()
            .last()
            .is_some_and(|unit| TIMEOUT_UNITS.contains(&unit));
        if !valid {
            errors.push(Diagnostic::new(
                BAD_TIMEOUT_UNIT,
                format!(
                    "Invalid timeout `{}`, unit must be one of s, m, h, d (line: `{}`)",
                    timeout, node.source_line
                ),
            ));
        }
    }
}

pub fn comma_lists(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    for node in all_nodes(pd) {
        let Some(signals) = node.step.signals() else {
            continue;
        };
        let signals = signals.trim();
        let commas = signals.matches(',').count();
        if commas == 0 {
            continue;
        }
        let elements = signals
            .split(',')
            .filter(|item| !item.trim().is_empty())
            .count();
        if elements != commas + 1 {
            errors.push(Diagnostic::new(
                MALFORMED_LIST,
                format!(
                    "Invalid comma-separated list `{}` (line: `{}`)",
                    signals, node.source_line
                ),
            ));
        }
    }
}

pub fn line_errors(pd: &ProcessDefinition, errors: &mut Vec<Diagnostic>) {
    for err in &pd.line_errors {
        let diagnostic = match err.kind {
            LineErrorKind::Unparseable => Diagnostic::new(
                UNPARSEABLE_LINE,
                format!("Could not parse line {}: `{}`", err.line_no, err.line),
            ),
            LineErrorKind::DuplicateName => Diagnostic::new(
                DUPLICATE_NAME,
                format!("Duplicate name in line {}: `{}`", err.line_no, err.line),
            ),
        };
        errors.push(diagnostic);
    }
}

/// A path is unused if neither the start line nor any path step refers to it.
/// Handler steps do not count. A single-path process never warns.
pub fn unused_paths(pd: &ProcessDefinition, warnings: &mut Vec<Diagnostic>) {
    if pd.paths.len() == 1 {
        return;
    }
    let graph = PathGraph::build(pd);
    let unused = graph.unreferenced(pd.config.start.path.trim());
    if !unused.is_empty() {
        warnings.push(Diagnostic::new(
            UNUSED_PATHS,
            format!("Unused paths found: {}", unused.join(", ")),
        ));
    }
}

/// Nodes of every path, then every handler, each in name order.
fn all_nodes(pd: &ProcessDefinition) -> impl Iterator<Item = &NodeItem> {
    pd.paths
        .values()
        .chain(pd.handlers.values())
        .flat_map(|block| block.nodes.iter())
}
