//! Core consultation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
mod session;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use session::ConversationSession;
pub use state::{
    ErrorNotice, Exchange, RequestId, Resume, SessionState, SessionView, Transcript, Turn,
    TurnRole, MAX_QUESTIONS,
};
pub use transition::{transition, TransitionContext, TransitionError, TransitionResult};
