//! Generator error taxonomy

use crate::llm::LlmError;
use crate::roadmap::RoadmapParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const QUOTA_MESSAGE: &str =
    "The AI counselor has hit its usage limit for now. Please wait a minute and submit again.";
const GENERIC_MESSAGE: &str =
    "Something went wrong while talking to the AI counselor. Please submit your answer again.";

/// Why a generator call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorErrorKind {
    /// Upstream rate or billing limit
    Quota,
    /// Network, parse, validation, anything else
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GeneratorError {
    pub kind: GeneratorErrorKind,
    /// Diagnostic detail for logs
    pub message: String,
}

impl GeneratorError {
    pub fn quota(message: impl Into<String>) -> Self {
        Self {
            kind: GeneratorErrorKind::Quota,
            message: message.into(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            kind: GeneratorErrorKind::Generic,
            message: message.into(),
        }
    }

    /// Text shown to the user; depends only on the kind
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            GeneratorErrorKind::Quota => QUOTA_MESSAGE,
            GeneratorErrorKind::Generic => GENERIC_MESSAGE,
        }
    }
}

impl From<LlmError> for GeneratorError {
    fn from(error: LlmError) -> Self {
        if error.is_quota() {
            Self::quota(error.message)
        } else {
            Self::generic(error.message)
        }
    }
}

impl From<RoadmapParseError> for GeneratorError {
    fn from(error: RoadmapParseError) -> Self {
        Self::generic(format!("Unusable roadmap: {error}"))
    }
}
