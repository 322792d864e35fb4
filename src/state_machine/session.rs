//! Session object owning the consultation state and transcript
//!
//! Applies transitions, performs transcript effects in place and hands the
//! generator effects back to whoever drives I/O.

use super::state::{RequestId, Transcript, MAX_QUESTIONS};
use super::transition::{transition, TransitionContext, TransitionError};
use super::{Effect, Event, SessionState, SessionView};

#[derive(Debug)]
pub struct ConversationSession {
    id: String,
    state: SessionState,
    transcript: Transcript,
    next_request_id: RequestId,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: SessionState::Welcome,
            transcript: Transcript::new(),
            next_request_id: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn current_view(&self) -> SessionView {
        SessionView {
            state: self.state.clone(),
            transcript: self.transcript.turns().to_vec(),
        }
    }

    pub fn start(&mut self) -> Result<Vec<Effect>, TransitionError> {
        self.handle(Event::Start)
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<Vec<Effect>, TransitionError> {
        self.handle(Event::SubmitAnswer {
            text: text.to_string(),
        })
    }

    pub fn restart(&mut self) -> Result<Vec<Effect>, TransitionError> {
        self.handle(Event::Restart)
    }

    /// Apply one event.
    ///
    /// Returns the external effects (generator requests and aborts) still to
    /// be executed. On error nothing about the session has changed.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let ctx = TransitionContext {
            transcript: &self.transcript,
            next_request_id: self.next_request_id,
        };
        let result = transition(&self.state, &ctx, event)?;

        let old = std::mem::replace(&mut self.state, result.new_state);
        if old.name() != self.state.name() {
            tracing::debug!(
                session_id = %self.id,
                from = old.name(),
                to = self.state.name(),
                "Session state changed"
            );
        }

        let mut external = Vec::new();
        for effect in result.effects {
            match effect {
                Effect::SeedTranscript { turn } => self.transcript.push(turn),
                Effect::CommitExchange { exchange } => self.transcript.commit(&exchange),
                Effect::ClearTranscript => self.transcript.clear(),
                Effect::RequestQuestion { .. } | Effect::RequestRoadmap { .. } => {
                    self.next_request_id += 1;
                    external.push(effect);
                }
                Effect::AbortRequest { .. } => external.push(effect),
            }
        }

        debug_assert!(self.invariants_hold(), "session invariants violated: {:?}", self);
        Ok(external)
    }

    fn invariants_hold(&self) -> bool {
        match &self.state {
            SessionState::Welcome => self.transcript.is_empty(),
            SessionState::Questioning { turn_index, .. }
            | SessionState::Thinking { turn_index, .. } => {
                *turn_index == self.transcript.question_count()
                    && (1..=MAX_QUESTIONS).contains(turn_index)
                    && self.transcript.len() == 2 * turn_index - 1
            }
            SessionState::RoadmapReady { .. } => {
                self.transcript.question_count() == MAX_QUESTIONS + 1
            }
        }
    }
}
