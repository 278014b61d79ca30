#![allow(dead_code)]

use procdef::parse::{self, ProcessDefinition};
use procdef::validate::{self, ValidationResult};

// =============================================================================
// Fixtures
// =============================================================================

pub const ORDER_MANAGEMENT: &str = include_str!("../fixtures/order_management.txt");
pub const SIGNALS: &str = include_str!("../fixtures/signals.txt");
pub const CUSTOM_VOCAB: &str = include_str!("../fixtures/custom_vocab.ini");

pub const LANG: &str = "en_uk";

// =============================================================================
// Builders
// =============================================================================

/// Parse with the built-in English vocabulary.
pub fn parse_en(text: &str) -> ProcessDefinition {
    parse::parse_builtin(text, LANG).expect("Should parse")
}

pub fn validate_en(text: &str) -> ValidationResult {
    validate::validate(&parse_en(text))
}

/// A complete `Config` block starting at `start`, followed by `blocks`.
pub fn process_text(start: &str, blocks: &[&str]) -> String {
    let mut text = format!(
        "Config:\n  Name: Test process\n  Start: {} from my.service\n",
        start
    );
    for block in blocks {
        text.push('\n');
        text.push_str(block.trim_end());
        text.push('\n');
    }
    text
}

/// Error messages carrying `code`, in reported order.
pub fn messages_for<'a>(result: &'a ValidationResult, code: &str) -> Vec<&'a str> {
    result
        .errors
        .iter()
        .chain(result.warnings.iter())
        .filter(|d| d.code == code)
        .map(|d| d.message.as_str())
        .collect()
}
