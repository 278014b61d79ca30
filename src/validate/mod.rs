//! Validation phase: structural and semantic checks of a parsed definition.
//!
//! Validation is a pure function of the definition. It never fails: every
//! problem becomes a `Diagnostic`, and an empty or garbage input still
//! yields a complete `ValidationResult`.

pub mod rules;

use serde::Serialize;
use tracing::debug;

use crate::parse::types::ProcessDefinition;

// Stable, externally visible codes. Never renumber.
pub const NAME_REQUIRED: &str = "EPROC-0001";
pub const START_INCOMPLETE: &str = "EPROC-0002";
pub const NO_PATHS: &str = "EPROC-0003";
pub const EMPTY_PATHS: &str = "EPROC-0004";
pub const DANGLING_PATH_REF: &str = "EPROC-0005";
pub const BAD_TIMEOUT_UNIT: &str = "EPROC-0006";
pub const MALFORMED_LIST: &str = "EPROC-0007";
pub const EMPTY_DEFINITION: &str = "EPROC-0008";
pub const UNPARSEABLE_LINE: &str = "EPROC-0009";
pub const DUPLICATE_NAME: &str = "EPROC-0010";
pub const UNUSED_PATHS: &str = "WPROC-0001";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// A definition passes only with no errors and no warnings.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn error_codes(&self) -> Vec<&'static str> {
        self.errors.iter().map(|d| d.code).collect()
    }

    pub fn warning_codes(&self) -> Vec<&'static str> {
        self.warnings.iter().map(|d| d.code).collect()
    }
}

/// Run every rule against `pd`. Rules do not short-circuit each other,
/// except that an empty source skips everything else.
pub fn validate(pd: &ProcessDefinition) -> ValidationResult {
    let mut result = ValidationResult::default();

    if pd.is_empty_source() {
        result.errors.push(Diagnostic::new(
            EMPTY_DEFINITION,
            "Process definition must not be empty",
        ));
        return result;
    }

    let errors = &mut result.errors;
    rules::name_required(pd, errors);
    rules::start_complete(pd, errors);
    rules::at_least_one_path(pd, errors);
    rules::no_empty_paths(pd, errors);
    rules::path_refs_exist(pd, errors);
    rules::timeout_units(pd, errors);
    rules::comma_lists(pd, errors);
    rules::line_errors(pd, errors);

    rules::unused_paths(pd, &mut result.warnings);

    // Stable: rule order is kept within one code.
    result.errors.sort_by(|a, b| a.code.cmp(b.code));
    result.warnings.sort_by(|a, b| a.code.cmp(b.code));

    debug!(
        name = %pd.config.name,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated process definition"
    );

    result
}
