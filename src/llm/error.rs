//! LLM error types

use thiserror::Error;

/// Provider failure, classified by what the caller can do about it
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Usage or billing limit (429, `RESOURCE_EXHAUSTED`)
    Quota,
    /// Provider never answered: connect, timeout, truncated body
    Transport,
    /// Provider refused the request as sent (4xx)
    Rejected,
    /// Provider answered with a failure or something unusable
    Provider,
}

impl LlmError {
    fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Quota, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Transport, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Rejected, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Provider, message)
    }

    /// Whether this is a usage-limit refusal.
    ///
    /// Some gateways wrap an upstream quota error in a generic failure, so
    /// provider failures also count when the message says so. Rejections
    /// never do: a 4xx may mention a quota project without being one.
    pub fn is_quota(&self) -> bool {
        match self.kind {
            LlmErrorKind::Quota => true,
            LlmErrorKind::Provider => self.message.to_lowercase().contains("quota"),
            LlmErrorKind::Transport | LlmErrorKind::Rejected => false,
        }
    }
}
