//! Consultation runtime executor

use super::Command;
use crate::generator::QuestionGenerator;
use crate::state_machine::{
    ConversationSession, Effect, ErrorNotice, Event, RequestId, SessionState, SessionView,
    TransitionError, Turn,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
enum RequestKind {
    Question,
    Roadmap,
}

struct InFlight {
    request_id: RequestId,
    cancel: CancellationToken,
}

/// Owns one session and executes its effects
pub struct ConsultationRuntime<G>
where
    G: QuestionGenerator + 'static,
{
    session: ConversationSession,
    generator: Arc<G>,
    command_rx: mpsc::Receiver<Command>,
    /// Generator results flow back through here
    result_tx: mpsc::Sender<Event>,
    result_rx: mpsc::Receiver<Event>,
    view_tx: watch::Sender<SessionView>,
    in_flight: Option<InFlight>,
}

impl<G> ConsultationRuntime<G>
where
    G: QuestionGenerator + 'static,
{
    pub fn new(
        session: ConversationSession,
        generator: G,
        command_rx: mpsc::Receiver<Command>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(8);
        Self {
            session,
            generator: Arc::new(generator),
            command_rx,
            result_tx,
            result_rx,
            view_tx,
            in_flight: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session.id(), "Starting consultation runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(Command { event, reply }) = command else {
                        break;
                    };
                    let outcome = self.process_event(event);
                    let _ = reply.send(outcome);
                }
                Some(event) = self.result_rx.recv() => {
                    let _ = self.process_event(event);
                }
            }
        }

        // Teardown while thinking must not resolve into a later transition
        self.abort_in_flight();
        tracing::info!(session_id = %self.session.id(), "Consultation runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let event_name = event.name();
        let is_failure = matches!(event, Event::GeneratorFailed { .. });
        let effects = match self.session.handle(event) {
            Ok(effects) => effects,
            Err(e @ TransitionError::StaleResponse { .. }) => {
                tracing::debug!(session_id = %self.session.id(), error = %e, "Dropped stale generator result");
                return Err(e);
            }
            Err(e) => {
                tracing::info!(
                    session_id = %self.session.id(),
                    event = event_name,
                    state = self.session.state().name(),
                    error = %e,
                    "Rejected event"
                );
                return Err(e);
            }
        };

        for effect in effects {
            self.execute_effect(effect);
        }

        if !self.session.state().is_thinking() {
            self.in_flight = None;
        }
        if let Some(notice) = failure_notice(is_failure, self.session.state()) {
            tracing::warn!(
                session_id = %self.session.id(),
                kind = ?notice.kind,
                turn_index = ?self.session.state().turn_index(),
                "Generator call failed, waiting for resubmission"
            );
        }

        self.view_tx.send_replace(self.session.current_view());
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestQuestion {
                request_id,
                transcript,
            } => self.spawn_request(request_id, RequestKind::Question, transcript),
            Effect::RequestRoadmap {
                request_id,
                transcript,
            } => self.spawn_request(request_id, RequestKind::Roadmap, transcript),
            Effect::AbortRequest { request_id } => {
                if self
                    .in_flight
                    .as_ref()
                    .is_some_and(|f| f.request_id == request_id)
                {
                    self.abort_in_flight();
                }
            }
            // Transcript effects are applied by the session itself
            Effect::SeedTranscript { .. }
            | Effect::CommitExchange { .. }
            | Effect::ClearTranscript => {}
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(
                session_id = %self.session.id(),
                request_id = in_flight.request_id,
                "Aborting generator request"
            );
            in_flight.cancel.cancel();
        }
    }

    fn spawn_request(&mut self, request_id: RequestId, kind: RequestKind, transcript: Vec<Turn>) {
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            request_id,
            cancel: cancel.clone(),
        });

        let generator = self.generator.clone();
        let result_tx = self.result_tx.clone();
        let session_id = self.session.id().to_string();

        tracing::debug!(
            session_id = %session_id,
            request_id,
            kind = ?kind,
            turns = transcript.len(),
            "Requesting generator"
        );

        tokio::spawn(async move {
            let start = Instant::now();
            let event = tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(session_id = %session_id, request_id, "Generator request cancelled");
                    return;
                }
                event = run_request(generator.as_ref(), request_id, kind, &transcript) => event,
            };

            tracing::debug!(
                session_id = %session_id,
                request_id,
                duration_ms = %start.elapsed().as_millis(),
                outcome = event.name(),
                "Generator request finished"
            );

            if !cancel.is_cancelled() {
                let _ = result_tx.send(event).await;
            }
        });
    }
}

/// Notice to report for an accepted event; only a generator failure sets one
fn failure_notice(is_failure: bool, state: &SessionState) -> Option<&ErrorNotice> {
    if is_failure {
        state.error()
    } else {
        None
    }
}

async fn run_request<G: QuestionGenerator + ?Sized>(
    generator: &G,
    request_id: RequestId,
    kind: RequestKind,
    transcript: &[Turn],
) -> Event {
    let outcome = match kind {
        RequestKind::Question => generator
            .next_question(transcript)
            .await
            .map(|question| Event::QuestionGenerated {
                request_id,
                question,
            }),
        RequestKind::Roadmap => generator
            .finalize(transcript)
            .await
            .map(|roadmap| Event::RoadmapGenerated {
                request_id,
                roadmap,
            }),
    };

    outcome.unwrap_or_else(|error| Event::GeneratorFailed { request_id, error })
}
