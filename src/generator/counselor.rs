//! LLM-backed career counselor
//!
//! Turns a transcript into provider requests and validates what comes back.

use super::{GeneratorError, QuestionGenerator};
use crate::llm::{LlmMessage, LlmRequest, LlmResponse, LlmService};
use crate::roadmap::{parse_roadmap, Roadmap};
use crate::state_machine::{Turn, TurnRole, MAX_QUESTIONS};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

const QUESTION_PROMPT: &str = r"You are an experienced career counselor for university students.
You are interviewing a student to understand their background, interests, strengths and goals.
Ask exactly ONE short follow-up question (at most 20 words) that builds on their previous answers.
Output only the question, with no preamble, numbering or quotes.";

const ROADMAP_PROMPT: &str = r#"You are an experienced career counselor for university students.
Using the interview so far, recommend the single best-fit career role and design a learning roadmap for it.
Respond with ONLY a JSON object of this exact shape:
{
  "roleName": string,
  "estimatedTotalTime": string,
  "difficulty": "Beginner" | "Intermediate" | "Advanced",
  "careerInsights": { "salaryRange": string, "demand": string, "keySkills": [string] },
  "phases": [
    {
      "title": string,
      "duration": string,
      "description": string,
      "topics": [string],
      "resources": [{ "name": string, "url": string }],
      "milestones": [string]
    }
  ]
}
Include exactly 4 phases, ordered from fundamentals to job readiness."#;

const FINALIZE_INSTRUCTION: &str =
    "That was my last answer. Please generate my personalized career roadmap now.";

const QUESTION_MAX_TOKENS: u32 = 100;
const ROADMAP_MAX_TOKENS: u32 = 4096;

/// Question generator backed by any [`LlmService`]
pub struct CounselorGenerator<L> {
    llm: L,
    timeout: Option<Duration>,
}

impl<L: LlmService> CounselorGenerator<L> {
    pub fn new(llm: L) -> Self {
        Self { llm, timeout: None }
    }

    /// Fail calls that take longer than `limit`
    #[must_use]
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, GeneratorError> {
        let call = self.llm.complete(&request);
        let response = with_limit(self.timeout, call).await?;
        Ok(response?)
    }
}

async fn with_limit<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, GeneratorError> {
    match limit {
        Some(limit) => timeout(limit, fut).await.map_err(|_| {
            tracing::warn!(limit_ms = %limit.as_millis(), "Generator call timed out");
            GeneratorError::generic(format!("Timed out after {}s", limit.as_secs_f32()))
        }),
        None => Ok(fut.await),
    }
}

fn to_messages(transcript: &[Turn]) -> Vec<LlmMessage> {
    transcript
        .iter()
        .map(|turn| match turn.role {
            TurnRole::User => LlmMessage::user(turn.content.clone()),
            TurnRole::Assistant => LlmMessage::assistant(turn.content.clone()),
        })
        .collect()
}

/// Reduce a model reply to a single question line.
///
/// Models sometimes lead with a courtesy line, so the last line that reads
/// as a question wins; otherwise the first non-empty line.
fn clean_question(reply: &str) -> Option<String> {
    let lines: Vec<&str> = reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_matches(|c: char| c == '"' || c == '*' || c == '`')
                .trim()
        })
        .filter(|line| !line.is_empty())
        .collect();

    let question = lines
        .iter()
        .rev()
        .find(|line| line.ends_with('?'))
        .or_else(|| lines.first())?;
    Some((*question).to_string())
}

#[async_trait]
impl<L: LlmService> QuestionGenerator for CounselorGenerator<L> {
    async fn next_question(&self, transcript: &[Turn]) -> Result<String, GeneratorError> {
        let asked = transcript
            .iter()
            .filter(|t| t.role == TurnRole::Assistant)
            .count();
        let system = format!(
            "{QUESTION_PROMPT}\nThis will be question {} of {MAX_QUESTIONS}.",
            asked + 1
        );

        let request = LlmRequest::new(to_messages(transcript))
            .with_system(system)
            .with_max_tokens(QUESTION_MAX_TOKENS)
            .with_temperature(0.7);

        let response = self.complete(request).await?;
        clean_question(&response.text())
            .ok_or_else(|| GeneratorError::generic("Counselor returned an empty question"))
    }

    async fn finalize(&self, transcript: &[Turn]) -> Result<Roadmap, GeneratorError> {
        let mut messages = to_messages(transcript);
        messages.push(LlmMessage::user(FINALIZE_INSTRUCTION));

        let request = LlmRequest::new(messages)
            .with_system(ROADMAP_PROMPT)
            .with_max_tokens(ROADMAP_MAX_TOKENS)
            .json();

        let response = self.complete(request).await?;
        let roadmap = parse_roadmap(&response.text()).inspect_err(|e| {
            tracing::warn!(error = %e, "Discarding unusable roadmap reply");
        })?;

        tracing::info!(
            role = %roadmap.role_name,
            phases = roadmap.phases.len(),
            "Roadmap generated"
        );
        Ok(roadmap)
    }
}
