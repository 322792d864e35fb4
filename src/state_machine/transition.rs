//! Pure state transition function

use super::state::{
    ErrorNotice, Exchange, RequestId, Resume, Transcript, Turn, MAX_QUESTIONS, OPENING_QUESTION,
    SEED_MESSAGE,
};
use super::{Effect, Event, SessionState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Still waiting for the counselor, please hold on")]
    Busy,
    #[error("Consultation has not been started")]
    NotStarted,
    #[error("Consultation already started")]
    AlreadyStarted,
    #[error("Consultation is complete, start a new one to continue")]
    ConsultationComplete,
    #[error("Discarding stale generator result for request {request_id}")]
    StaleResponse { request_id: RequestId },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Read-only inputs a transition may consult besides the state itself
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Committed transcript
    pub transcript: &'a Transcript,
    /// Id to stamp on a generator request issued by this transition
    pub next_request_id: RequestId,
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs; all I/O is
/// described by the returned effects.
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &SessionState,
    ctx: &TransitionContext<'_>,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Restart (accepted from every state)
        // ============================================================
        (state, Event::Restart) => {
            let mut result = TransitionResult::new(SessionState::Welcome);
            if let SessionState::Thinking { request_id, .. } = state {
                result = result.with_effect(Effect::AbortRequest {
                    request_id: *request_id,
                });
            }
            Ok(result.with_effect(Effect::ClearTranscript))
        }

        // ============================================================
        // Start
        // ============================================================
        (SessionState::Welcome, Event::Start) => Ok(TransitionResult::new(
            SessionState::Questioning {
                current_question: OPENING_QUESTION.to_string(),
                turn_index: 1,
                error: None,
            },
        )
        .with_effect(Effect::SeedTranscript {
            turn: Turn::user(SEED_MESSAGE),
        })),

        (_, Event::Start) => Err(TransitionError::AlreadyStarted),

        // ============================================================
        // Answer submission
        // ============================================================

        // Blank answers never reach the transcript
        (SessionState::Questioning { .. }, Event::SubmitAnswer { text })
            if text.trim().is_empty() =>
        {
            Ok(TransitionResult::new(state.clone()))
        }

        (
            SessionState::Questioning {
                current_question,
                turn_index,
                ..
            },
            Event::SubmitAnswer { text },
        ) => {
            let pending = Exchange::new(current_question.clone(), text.trim());
            let request_id = ctx.next_request_id;
            let transcript = ctx.transcript.with_exchange(&pending);

            let (resume_to, request) = if *turn_index >= MAX_QUESTIONS {
                (
                    Resume::Finalizing,
                    Effect::RequestRoadmap {
                        request_id,
                        transcript,
                    },
                )
            } else {
                (
                    Resume::NextQuestion,
                    Effect::RequestQuestion {
                        request_id,
                        transcript,
                    },
                )
            };

            Ok(TransitionResult::new(SessionState::Thinking {
                current_question: current_question.clone(),
                turn_index: *turn_index,
                pending,
                resume_to,
                request_id,
            })
            .with_effect(request))
        }

        (SessionState::Thinking { .. }, Event::SubmitAnswer { .. }) => {
            Err(TransitionError::Busy)
        }
        (SessionState::Welcome, Event::SubmitAnswer { .. }) => Err(TransitionError::NotStarted),
        (SessionState::RoadmapReady { .. }, Event::SubmitAnswer { .. }) => {
            Err(TransitionError::ConsultationComplete)
        }

        // ============================================================
        // Generator results
        // ============================================================
        (
            SessionState::Thinking {
                turn_index,
                pending,
                resume_to: Resume::NextQuestion,
                request_id,
                ..
            },
            Event::QuestionGenerated {
                request_id: answered,
                question,
            },
        ) if *request_id == answered => Ok(TransitionResult::new(SessionState::Questioning {
            current_question: question,
            turn_index: turn_index + 1,
            error: None,
        })
        .with_effect(Effect::CommitExchange {
            exchange: pending.clone(),
        })),

        (
            SessionState::Thinking {
                pending,
                resume_to: Resume::Finalizing,
                request_id,
                ..
            },
            Event::RoadmapGenerated {
                request_id: answered,
                roadmap,
            },
        ) if *request_id == answered => {
            Ok(TransitionResult::new(SessionState::RoadmapReady { roadmap }).with_effect(
                Effect::CommitExchange {
                    exchange: pending.clone(),
                },
            ))
        }

        // Failure: back to the same question, transcript untouched
        (
            SessionState::Thinking {
                current_question,
                turn_index,
                request_id,
                ..
            },
            Event::GeneratorFailed {
                request_id: answered,
                error,
            },
        ) if *request_id == answered => Ok(TransitionResult::new(SessionState::Questioning {
            current_question: current_question.clone(),
            turn_index: *turn_index,
            error: Some(ErrorNotice::from(&error)),
        })),

        (SessionState::Thinking { request_id, .. }, event)
            if event.request_id() == Some(*request_id) =>
        {
            Err(TransitionError::InvalidTransition(format!(
                "{} does not answer the pending request",
                event.name()
            )))
        }

        (_, event) if event.request_id().is_some() => Err(TransitionError::StaleResponse {
            request_id: event.request_id().unwrap_or_default(),
        }),

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {}",
            state.name(),
            event.name()
        ))),
    }
}
