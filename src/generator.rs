//! Question generator: the collaborator that writes interview questions and
//! the final roadmap from a transcript

mod counselor;
mod error;

pub use counselor::CounselorGenerator;
pub use error::{GeneratorError, GeneratorErrorKind};

use crate::roadmap::Roadmap;
use crate::state_machine::Turn;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the next question or the final roadmap.
///
/// Both calls must be safe to repeat with the same transcript.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Short follow-up question given the transcript so far
    async fn next_question(&self, transcript: &[Turn]) -> Result<String, GeneratorError>;

    /// Roadmap synthesized from the complete interview
    async fn finalize(&self, transcript: &[Turn]) -> Result<Roadmap, GeneratorError>;
}

#[async_trait]
impl<T: QuestionGenerator + ?Sized> QuestionGenerator for Arc<T> {
    async fn next_question(&self, transcript: &[Turn]) -> Result<String, GeneratorError> {
        (**self).next_question(transcript).await
    }

    async fn finalize(&self, transcript: &[Turn]) -> Result<Roadmap, GeneratorError> {
        (**self).finalize(transcript).await
    }
}
