//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::error::ProcessError;
use crate::validate::{Diagnostic, ValidationResult};

/// Parse + validate a process text under a built-in language.
/// Returns `{ is_valid, errors, warnings }`.
#[wasm_bindgen]
pub fn validate_definition(text: &str, lang_code: &str) -> JsValue {
    let result = validate_definition_inner(text, lang_code);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_definition_inner(text: &str, lang_code: &str) -> ValidationDto {
    match crate::parse::parse_builtin(text, lang_code) {
        Ok(pd) => ValidationDto::from(crate::validate::validate(&pd)),
        Err(e) => ValidationDto {
            is_valid: false,
            errors: vec![DiagnosticDto::from(e)],
            warnings: Vec::new(),
        },
    }
}

/// Parse a process text and render its text interchange form.
/// Returns a JSON object with either `text` (success) or `errors` (failure).
#[wasm_bindgen]
pub fn definition_text_form(text: &str, lang_code: &str) -> JsValue {
    let result = definition_text_form_inner(text, lang_code);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn definition_text_form_inner(text: &str, lang_code: &str) -> TextFormResult {
    let pd = match crate::parse::parse_builtin(text, lang_code) {
        Ok(pd) => pd,
        Err(e) => return TextFormResult::Errors(vec![DiagnosticDto::from(e)]),
    };

    match pd.to_text_form() {
        Ok(text) => TextFormResult::Success(text),
        Err(e) => TextFormResult::Errors(vec![DiagnosticDto::from(e)]),
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize, serde::Deserialize)]
struct DiagnosticDto {
    code: String,
    message: String,
}

impl From<Diagnostic> for DiagnosticDto {
    fn from(d: Diagnostic) -> Self {
        DiagnosticDto {
            code: d.code.to_string(),
            message: d.message,
        }
    }
}

impl From<ProcessError> for DiagnosticDto {
    fn from(e: ProcessError) -> Self {
        DiagnosticDto {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ValidationDto {
    is_valid: bool,
    errors: Vec<DiagnosticDto>,
    warnings: Vec<DiagnosticDto>,
}

impl From<ValidationResult> for ValidationDto {
    fn from(result: ValidationResult) -> Self {
        ValidationDto {
            is_valid: result.is_valid(),
            errors: result.errors.into_iter().map(DiagnosticDto::from).collect(),
            warnings: result.warnings.into_iter().map(DiagnosticDto::from).collect(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", content = "value")]
enum TextFormResult {
    #[serde(rename = "success")]
    Success(String),
    #[serde(rename = "errors")]
    Errors(Vec<DiagnosticDto>),
}
