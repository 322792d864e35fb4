//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::*;
use crate::generator::GeneratorError;
use crate::roadmap::sample_roadmap;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Abstract user/generator actions; generator actions answer whatever
/// request is pending so sequences stay meaningful
#[derive(Debug, Clone)]
enum Action {
    Start,
    Submit(String),
    Restart,
    Succeed,
    Fail { quota: bool },
    Stale,
}

fn arb_answer() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,.]{1,40}",
        Just(String::new()),
        Just("   ".to_string()),
        Just("\t\n".to_string()),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => Just(Action::Start),
        4 => arb_answer().prop_map(Action::Submit),
        1 => Just(Action::Restart),
        4 => Just(Action::Succeed),
        2 => any::<bool>().prop_map(|quota| Action::Fail { quota }),
        1 => Just(Action::Stale),
    ]
}

fn to_event(session: &ConversationSession, action: &Action) -> Event {
    let pending = match session.state() {
        SessionState::Thinking {
            request_id,
            resume_to,
            ..
        } => Some((*request_id, *resume_to)),
        _ => None,
    };

    match (action, pending) {
        (Action::Start, _) => Event::Start,
        (Action::Submit(text), _) => Event::SubmitAnswer { text: text.clone() },
        (Action::Restart, _) => Event::Restart,
        (Action::Succeed, Some((request_id, Resume::NextQuestion))) => Event::QuestionGenerated {
            request_id,
            question: "And then?".to_string(),
        },
        (Action::Succeed, Some((request_id, Resume::Finalizing))) => Event::RoadmapGenerated {
            request_id,
            roadmap: sample_roadmap(4),
        },
        (Action::Fail { quota }, Some((request_id, _))) => Event::GeneratorFailed {
            request_id,
            error: if *quota {
                GeneratorError::quota("quota")
            } else {
                GeneratorError::generic("boom")
            },
        },
        (Action::Stale, Some((request_id, _))) => Event::QuestionGenerated {
            request_id: request_id.saturating_sub(1),
            question: "Stale?".to_string(),
        },
        // Generator actions with nothing pending arrive late
        (_, None) => Event::GeneratorFailed {
            request_id: 0,
            error: GeneratorError::generic("late"),
        },
    }
}

fn arb_transcript_len() -> impl Strategy<Value = usize> {
    1..=MAX_QUESTIONS
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn is_consistent(session: &ConversationSession) -> bool {
    let transcript = session.transcript();
    match session.state() {
        SessionState::Welcome => transcript.is_empty(),
        SessionState::Questioning { turn_index, .. } | SessionState::Thinking { turn_index, .. } => {
            *turn_index == transcript.question_count()
                && (1..=MAX_QUESTIONS).contains(turn_index)
                && transcript.turns()[0] == Turn::user(SEED_MESSAGE)
        }
        SessionState::RoadmapReady { roadmap } => {
            transcript.len() == 2 * MAX_QUESTIONS + 1 && roadmap.phases.len() == 4
        }
    }
}

fn drive(turns: usize) -> ConversationSession {
    let mut session = ConversationSession::new();
    session.start().unwrap();
    for _ in 1..turns {
        session.submit_answer("answer").unwrap();
        let event = to_event(&session, &Action::Succeed);
        session.handle(event).unwrap();
    }
    session
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Session stays consistent under any action sequence
    #[test]
    fn prop_actions_preserve_consistency(actions in proptest::collection::vec(arb_action(), 0..60)) {
        let mut session = ConversationSession::new();

        for action in actions {
            let before = session.current_view();
            let event = to_event(&session, &action);
            match session.handle(event) {
                Ok(_) => {
                    prop_assert!(is_consistent(&session), "Inconsistent: {session:?}");
                    // Only restart ever shrinks the transcript
                    if !matches!(action, Action::Restart) {
                        prop_assert!(session.transcript().len() >= before.transcript.len());
                        prop_assert_eq!(
                            &session.transcript().turns()[..before.transcript.len()],
                            &before.transcript[..]
                        );
                    }
                }
                Err(_) => {
                    prop_assert_eq!(session.current_view(), before, "Rejected event mutated session");
                }
            }
        }
    }

    // Invariant 2: Blank answers never change state or transcript
    #[test]
    fn prop_blank_submit_is_noop(turns in arb_transcript_len(), blank in "[ \t\n]{0,8}") {
        let mut session = drive(turns);
        let before = session.current_view();

        let effects = session.submit_answer(&blank).unwrap();
        prop_assert!(effects.is_empty());
        prop_assert_eq!(session.current_view(), before);
    }

    // Invariant 3: Generator failure never changes transcript length
    #[test]
    fn prop_failure_preserves_transcript(turns in arb_transcript_len(), quota in any::<bool>(), answer in "[a-z]{1,20}") {
        let mut session = drive(turns);
        let len = session.transcript().len();

        session.submit_answer(&answer).unwrap();
        let event = to_event(&session, &Action::Fail { quota });
        session.handle(event).unwrap();

        prop_assert_eq!(session.transcript().len(), len);
        prop_assert_eq!(session.state().turn_index(), Some(turns));
        prop_assert!(session.state().error().is_some());
    }

    // Invariant 4: Success before the last question advances by exactly one
    #[test]
    fn prop_success_advances(turns in 1..MAX_QUESTIONS, answer in "[a-z]{1,20}") {
        let mut session = drive(turns);
        let len = session.transcript().len();

        let effects = session.submit_answer(&answer).unwrap();
        let requested_question = matches!(effects[..], [Effect::RequestQuestion { .. }]);
        prop_assert!(requested_question, "expected a question request, got {effects:?}");
        let event = to_event(&session, &Action::Succeed);
        session.handle(event).unwrap();

        prop_assert_eq!(session.state().turn_index(), Some(turns + 1));
        prop_assert_eq!(session.transcript().len(), len + 2);
    }

    // Invariant 5: Restart from anywhere reaches Welcome with nothing left
    #[test]
    fn prop_restart_always_resets(actions in proptest::collection::vec(arb_action(), 0..40)) {
        let mut session = ConversationSession::new();
        for action in actions {
            let event = to_event(&session, &action);
            let _ = session.handle(event);
        }

        let was_thinking = session.state().is_thinking();
        let effects = session.restart().unwrap();

        prop_assert_eq!(session.current_view(), SessionView::default());
        prop_assert_eq!(
            was_thinking,
            effects.iter().any(|e| matches!(e, Effect::AbortRequest { .. }))
        );
    }

    // Invariant 6: Only Questioning accepts a non-blank answer
    #[test]
    fn prop_single_flight(turns in arb_transcript_len(), answer in "[a-z]{1,20}") {
        let mut session = drive(turns);
        session.submit_answer(&answer).unwrap();
        prop_assert_eq!(
            session.submit_answer(&answer).unwrap_err(),
            TransitionError::Busy
        );
    }
}

#[test]
fn test_last_question_always_finalizes() {
    let mut session = drive(MAX_QUESTIONS);
    let effects = session.submit_answer("done").unwrap();
    assert!(matches!(effects[..], [Effect::RequestRoadmap { .. }]));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::RequestQuestion { .. })));
}
