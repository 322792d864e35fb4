//! Consultation state types

use crate::generator::{GeneratorError, GeneratorErrorKind};
use crate::roadmap::Roadmap;
use serde::{Deserialize, Serialize};

/// Number of interview questions before the roadmap is requested
pub const MAX_QUESTIONS: usize = 6;

/// Fixed user turn that opens every transcript
pub const SEED_MESSAGE: &str = "I am starting my career consultation. Please ask me one question at a time \
to understand my background, interests and goals, then build me a career roadmap.";

/// First question shown after `start`, asked without a generator round-trip
pub const OPENING_QUESTION: &str =
    "Let's begin! Tell me about your current education: what are you studying, and which year are you in?";

/// Identifies one generator call; monotonic for the lifetime of a session
pub type RequestId = u64;

// ============================================================================
// Transcript
// ============================================================================

/// Speaker of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message in the interview transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// A question and the answer given to it, staged until the generator call
/// it triggered succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn turns(&self) -> [Turn; 2] {
        [
            Turn::assistant(self.question.clone()),
            Turn::user(self.answer.clone()),
        ]
    }
}

/// Ordered, append-only history of a session.
///
/// Only the owning session mutates it; a restart clears it in full.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of the question currently being asked: assistant turns + 1
    pub fn question_count(&self) -> usize {
        question_count(&self.turns)
    }

    /// Snapshot of the transcript as it would look with `exchange` committed
    pub fn with_exchange(&self, exchange: &Exchange) -> Vec<Turn> {
        let mut turns = self.turns.clone();
        turns.extend(exchange.turns());
        turns
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub(crate) fn commit(&mut self, exchange: &Exchange) {
        self.turns.extend(exchange.turns());
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}

pub(crate) fn question_count(turns: &[Turn]) -> usize {
    turns
        .iter()
        .filter(|t| t.role == TurnRole::Assistant)
        .count()
        + 1
}

// ============================================================================
// Session State
// ============================================================================

/// Where a `Thinking` session goes once the generator answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resume {
    /// Waiting for the next interview question
    NextQuestion,
    /// Waiting for the final roadmap
    Finalizing,
}

/// Human-readable failure shown alongside the question that can be retried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub kind: GeneratorErrorKind,
    pub message: String,
}

impl From<&GeneratorError> for ErrorNotice {
    fn from(error: &GeneratorError) -> Self {
        Self {
            kind: error.kind,
            message: error.user_message().to_string(),
        }
    }
}

/// Consultation state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Not started yet, transcript empty
    #[default]
    Welcome,

    /// Waiting for the user's answer to `current_question`
    Questioning {
        current_question: String,
        /// 1-based question number, always `Transcript::question_count()`
        turn_index: usize,
        /// Set when the previous generator call failed
        error: Option<ErrorNotice>,
    },

    /// Generator call in flight; no submissions accepted
    Thinking {
        current_question: String,
        turn_index: usize,
        pending: Exchange,
        resume_to: Resume,
        request_id: RequestId,
    },

    /// Consultation finished; only `restart` leaves this state
    RoadmapReady { roadmap: Roadmap },
}

impl SessionState {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Welcome => "welcome",
            SessionState::Questioning { .. } => "questioning",
            SessionState::Thinking { .. } => "thinking",
            SessionState::RoadmapReady { .. } => "roadmap_ready",
        }
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, SessionState::Thinking { .. })
    }

    pub fn turn_index(&self) -> Option<usize> {
        match self {
            SessionState::Questioning { turn_index, .. }
            | SessionState::Thinking { turn_index, .. } => Some(*turn_index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&str> {
        match self {
            SessionState::Questioning {
                current_question, ..
            }
            | SessionState::Thinking {
                current_question, ..
            } => Some(current_question),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        match self {
            SessionState::Questioning { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    pub fn roadmap(&self) -> Option<&Roadmap> {
        match self {
            SessionState::RoadmapReady { roadmap } => Some(roadmap),
            _ => None,
        }
    }
}

/// Read-only projection handed to callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub transcript: Vec<Turn>,
}

impl SessionView {
    pub fn question_count(&self) -> usize {
        question_count(&self.transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_count_is_derived_from_assistant_turns() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.question_count(), 1);

        transcript.push(Turn::user(SEED_MESSAGE));
        assert_eq!(transcript.question_count(), 1);

        transcript.commit(&Exchange::new(OPENING_QUESTION, "B.Tech CSE, 3rd year"));
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.question_count(), 2);
        assert_eq!(transcript.turns()[1].role, TurnRole::Assistant);
        assert_eq!(transcript.turns()[2].content, "B.Tech CSE, 3rd year");
    }

    #[test]
    fn test_with_exchange_does_not_mutate() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user(SEED_MESSAGE));
        let snapshot = transcript.with_exchange(&Exchange::new("Q?", "A"));
        assert_eq!(snapshot.len(), 3);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_state_serializes_with_type_tag() {
        let state = SessionState::Questioning {
            current_question: "Q?".to_string(),
            turn_index: 2,
            error: None,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["type"], "questioning");
        assert_eq!(value["turn_index"], 2);

        let back: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_accessors() {
        let state = SessionState::Thinking {
            current_question: "Q?".to_string(),
            turn_index: 3,
            pending: Exchange::new("Q?", "A"),
            resume_to: Resume::NextQuestion,
            request_id: 7,
        };
        assert!(state.is_thinking());
        assert_eq!(state.turn_index(), Some(3));
        assert_eq!(state.current_question(), Some("Q?"));
        assert!(state.error().is_none());
        assert_eq!(SessionState::Welcome.turn_index(), None);
    }
}
