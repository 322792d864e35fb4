//! Effects produced by state transitions

use crate::state_machine::state::{Exchange, RequestId, Turn};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append the fixed opening user turn
    SeedTranscript { turn: Turn },

    /// Append a staged question/answer pair
    CommitExchange { exchange: Exchange },

    /// Drop every turn
    ClearTranscript,

    /// Ask the generator for the next interview question
    RequestQuestion {
        request_id: RequestId,
        transcript: Vec<Turn>,
    },

    /// Ask the generator for the final roadmap
    RequestRoadmap {
        request_id: RequestId,
        transcript: Vec<Turn>,
    },

    /// Cancel an in-flight generator call
    AbortRequest { request_id: RequestId },
}
