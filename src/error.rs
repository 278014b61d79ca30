//! Unified error type for structural failures across all phases.
//!
//! Authoring problems in a process text never surface here; they are
//! collected as `validate::Diagnostic`s. A `ProcessError` means the
//! vocabulary, a text form or the store is broken and the call cannot go on.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Vocabulary,
    Parse,
    TextForm,
    Store,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Vocabulary => write!(f, "Vocabulary"),
            Phase::Parse => write!(f, "Parse"),
            Phase::TextForm => write!(f, "TextForm"),
            Phase::Store => write!(f, "Store"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("[{phase}:{code}] {message}")]
    Structural {
        code: &'static str,
        phase: Phase,
        message: String,
    },

    #[error("[TextForm:TXT-001] Could not decode text form: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("[Store:{code}] {source}", code = .source.code())]
    Store {
        #[from]
        source: StoreError,
    },
}

impl ProcessError {
    pub fn vocabulary(code: &'static str, message: impl Into<String>) -> Self {
        ProcessError::Structural {
            code,
            phase: Phase::Vocabulary,
            message: message.into(),
        }
    }

    pub fn parse(code: &'static str, message: impl Into<String>) -> Self {
        ProcessError::Structural {
            code,
            phase: Phase::Parse,
            message: message.into(),
        }
    }

    pub fn text_form(code: &'static str, message: impl Into<String>) -> Self {
        ProcessError::Structural {
            code,
            phase: Phase::TextForm,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProcessError::Structural { code, .. } => code,
            ProcessError::Yaml(_) => "TXT-001",
            ProcessError::Store { source } => source.code(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ProcessError::Structural { phase, .. } => *phase,
            ProcessError::Yaml(_) => Phase::TextForm,
            ProcessError::Store { .. } => Phase::Store,
        }
    }

    /// Whether the caller may retry the same call unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProcessError::Store { source } if source.is_retryable())
    }
}
