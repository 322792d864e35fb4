//! Runtime for driving consultations
//!
//! A [`ConsultationRuntime`] owns one session, runs generator calls as
//! cancellable tasks and publishes a [`SessionView`] after every accepted
//! event. Callers talk to it through a [`ConsultationHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ConsultationRuntime;

use crate::generator::QuestionGenerator;
use crate::state_machine::{ConversationSession, Event, SessionView, TransitionError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

const COMMAND_BUFFER: usize = 16;

/// User event plus the channel its outcome is reported on
#[derive(Debug)]
pub struct Command {
    event: Event,
    reply: oneshot::Sender<Result<(), TransitionError>>,
}

#[derive(Debug, Error)]
pub enum HandleError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("consultation runtime has stopped")]
    Closed,
}

/// Handle to a running consultation
///
/// Dropping every handle stops the runtime and abandons any in-flight
/// generator call.
#[derive(Clone)]
pub struct ConsultationHandle {
    session_id: String,
    command_tx: mpsc::Sender<Command>,
    view_rx: watch::Receiver<SessionView>,
}

impl ConsultationHandle {
    /// Spawn a runtime for a fresh session. Must be called inside a tokio runtime.
    pub fn spawn<G>(generator: G) -> Self
    where
        G: QuestionGenerator + 'static,
    {
        Self::spawn_session(ConversationSession::new(), generator)
    }

    pub fn spawn_session<G>(session: ConversationSession, generator: G) -> Self
    where
        G: QuestionGenerator + 'static,
    {
        let session_id = session.id().to_string();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view_rx) = watch::channel(session.current_view());

        let runtime = ConsultationRuntime::new(session, generator, command_rx, view_tx);
        tokio::spawn(runtime.run());

        Self {
            session_id,
            command_tx,
            view_rx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn start(&self) -> Result<(), HandleError> {
        self.send(Event::Start).await
    }

    pub async fn submit_answer(&self, text: impl Into<String>) -> Result<(), HandleError> {
        self.send(Event::SubmitAnswer { text: text.into() }).await
    }

    pub async fn restart(&self) -> Result<(), HandleError> {
        self.send(Event::Restart).await
    }

    /// Latest published snapshot
    pub fn current_view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Wait until no generator call is pending
    pub async fn settled(&self) -> Result<SessionView, HandleError> {
        let mut rx = self.view_rx.clone();
        let view = rx
            .wait_for(|view| !view.state.is_thinking())
            .await
            .map_err(|_| HandleError::Closed)?;
        Ok(view.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    async fn send(&self, event: Event) -> Result<(), HandleError> {
        let (reply, outcome) = oneshot::channel();
        self.command_tx
            .send(Command { event, reply })
            .await
            .map_err(|_| HandleError::Closed)?;
        outcome.await.map_err(|_| HandleError::Closed)??;
        Ok(())
    }
}
