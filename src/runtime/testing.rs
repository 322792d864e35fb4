//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real generative service.

use crate::generator::{GeneratorError, QuestionGenerator};
use crate::roadmap::Roadmap;
use crate::state_machine::Turn;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Which generator call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    NextQuestion,
    Finalize,
}

// ============================================================================
// Mock Generator
// ============================================================================

/// Mock generator that returns queued results
#[derive(Default)]
pub struct MockGenerator {
    questions: Mutex<VecDeque<Result<String, GeneratorError>>>,
    roadmaps: Mutex<VecDeque<Result<Roadmap, GeneratorError>>>,
    /// Record of every call with the transcript it was given
    pub calls: Mutex<Vec<(CallKind, Vec<Turn>)>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_question(&self, question: impl Into<String>) {
        self.questions
            .lock()
            .unwrap()
            .push_back(Ok(question.into()));
    }

    pub fn queue_question_error(&self, error: GeneratorError) {
        self.questions.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_roadmap(&self, roadmap: Roadmap) {
        self.roadmaps.lock().unwrap().push_back(Ok(roadmap));
    }

    pub fn queue_roadmap_error(&self, error: GeneratorError) {
        self.roadmaps.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<(CallKind, Vec<Turn>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    async fn next_question(&self, transcript: &[Turn]) -> Result<String, GeneratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((CallKind::NextQuestion, transcript.to_vec()));
        self.questions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeneratorError::generic("No mock question queued")))
    }

    async fn finalize(&self, transcript: &[Turn]) -> Result<Roadmap, GeneratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((CallKind::Finalize, transcript.to_vec()));
        self.roadmaps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeneratorError::generic("No mock roadmap queued")))
    }
}

// ============================================================================
// Delayed Mock Generator (for restart/teardown races)
// ============================================================================

/// Mock generator that sleeps before answering
pub struct DelayedMockGenerator {
    pub inner: MockGenerator,
    delay: Duration,
    /// Notified when a call starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockGenerator {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockGenerator::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl QuestionGenerator for DelayedMockGenerator {
    async fn next_question(&self, transcript: &[Turn]) -> Result<String, GeneratorError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_question(transcript).await
    }

    async fn finalize(&self, transcript: &[Turn]) -> Result<Roadmap, GeneratorError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.finalize(transcript).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roadmap::sample_roadmap;

    #[tokio::test]
    async fn test_mock_generator_replays_queue() {
        let mock = MockGenerator::new();
        mock.queue_question("First?");
        mock.queue_roadmap(sample_roadmap(4));

        let transcript = vec![Turn::user("hi")];
        assert_eq!(mock.next_question(&transcript).await.unwrap(), "First?");
        assert_eq!(mock.finalize(&transcript).await.unwrap().phases.len(), 4);

        // Empty queues fail instead of hanging
        assert!(mock.next_question(&transcript).await.is_err());
        assert!(mock.finalize(&transcript).await.is_err());

        let calls = mock.recorded_calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].0, CallKind::NextQuestion);
        assert_eq!(calls[1].0, CallKind::Finalize);
    }
}
