//! Events that can occur in a consultation

use crate::generator::GeneratorError;
use crate::roadmap::Roadmap;
use crate::state_machine::state::RequestId;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Start,
    SubmitAnswer {
        text: String,
    },
    Restart,

    // Generator events
    QuestionGenerated {
        request_id: RequestId,
        question: String,
    },
    RoadmapGenerated {
        request_id: RequestId,
        roadmap: Roadmap,
    },
    GeneratorFailed {
        request_id: RequestId,
        error: GeneratorError,
    },
}

impl Event {
    /// Request id for generator events, `None` for user events
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Event::QuestionGenerated { request_id, .. }
            | Event::RoadmapGenerated { request_id, .. }
            | Event::GeneratorFailed { request_id, .. } => Some(*request_id),
            Event::Start | Event::SubmitAnswer { .. } | Event::Restart => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::SubmitAnswer { .. } => "submit_answer",
            Event::Restart => "restart",
            Event::QuestionGenerated { .. } => "question_generated",
            Event::RoadmapGenerated { .. } => "roadmap_generated",
            Event::GeneratorFailed { .. } => "generator_failed",
        }
    }
}
