//! Placeholder patterns shared by config, pipeline and node lines.
//!
//! A pattern such as `Start: {path} from {service}` compiles into an anchored
//! regex with one named group per placeholder. Matching is purely syntactic:
//! captured values are returned as-is and interpreted further downstream.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::ProcessError;

/// Placeholder name → captured text.
pub type Captures = BTreeMap<String, String>;

/// A compiled vocabulary pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    source: String,
    regex: Regex,
    fields: Vec<String>,
}

impl Matcher {
    /// The pattern text this matcher was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in the order they appear in the pattern.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Match a whole line. `None` only means "try the next pattern".
    pub fn captures(&self, line: &str) -> Option<Captures> {
        let caps = self.regex.captures(line)?;
        let mut out = Captures::new();
        for name in &self.fields {
            if let Some(m) = caps.name(name) {
                out.insert(name.clone(), m.as_str().to_string());
            }
        }
        Some(out)
    }
}

/// Compile a `{placeholder}` pattern into a total-line matcher.
pub fn compile(pattern: &str) -> Result<Matcher, ProcessError> {
    let mut expr = String::from("^");
    let mut fields: Vec<String> = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let literal = &rest[..open];
        if literal.contains('}') {
            return Err(unbalanced(pattern));
        }
        let Some(len) = rest[open..].find('}') else {
            return Err(unbalanced(pattern));
        };
        let close = open + len;
        let name = &rest[open + 1..close];

        if !is_field_name(name) {
            return Err(ProcessError::vocabulary(
                "VOC-003",
                format!("Invalid placeholder '{{{}}}' in pattern '{}'", name, pattern),
            ));
        }
        if fields.iter().any(|f| f == name) {
            return Err(ProcessError::vocabulary(
                "VOC-003",
                format!("Placeholder '{{{}}}' used twice in pattern '{}'", name, pattern),
            ));
        }

        expr.push_str(&regex::escape(literal));
        expr.push_str(&format!("(?P<{}>.+?)", name));
        fields.push(name.to_string());
        rest = &rest[close + 1..];
    }

    if rest.contains('}') {
        return Err(unbalanced(pattern));
    }
    expr.push_str(&regex::escape(rest));
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|e| {
        ProcessError::vocabulary(
            "VOC-003",
            format!("Pattern '{}' does not compile: {}", pattern, e),
        )
    })?;

    Ok(Matcher {
        source: pattern.to_string(),
        regex,
        fields,
    })
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unbalanced(pattern: &str) -> ProcessError {
    ProcessError::vocabulary(
        "VOC-003",
        format!("Unbalanced braces in pattern '{}'", pattern),
    )
}
