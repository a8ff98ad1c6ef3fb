// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Registration Invariants
//!
//! Every test runs a random sequence of requests through [`Mutation::run`]
//! and commits the resulting transitions the way a repository would. The
//! invariants are checked after each step, not just at the end.

use proptest::prelude::*;

use cim_registration::aggregate::*;
use cim_registration::domain::{Email, RegistrationStatus, CODE_ALPHABET};
use cim_registration::events::RegistrationEvent;
use cim_registration::state_machine::StateInvariant;
use cim_registration::RegistrationConfig;

use crate::fixtures::*;

// ============================================================================
// Request Model
// ============================================================================

/// A request arriving `delay` seconds after the previous one
#[derive(Debug, Clone)]
enum Request {
    Verify { correct: bool },
    Check { correct: bool },
    Resend,
    CompleteStudent { correct: bool },
    CompleteStaff { correct: bool },
}

fn request() -> impl Strategy<Value = Request> {
    prop_oneof![
        4 => any::<bool>().prop_map(|correct| Request::Verify { correct }),
        2 => any::<bool>().prop_map(|correct| Request::Check { correct }),
        3 => Just(Request::Resend),
        1 => any::<bool>().prop_map(|correct| Request::CompleteStudent { correct }),
        1 => any::<bool>().prop_map(|correct| Request::CompleteStaff { correct }),
    ]
}

/// Requests paired with the delay before each one, up to four minutes
fn request_sequence() -> impl Strategy<Value = Vec<(Request, i64)>> {
    prop::collection::vec((request(), 0i64..240), 1..20)
}

/// Bind a request to the current aggregate and build its mutation
fn mutation<'a>(
    request: &Request,
    current: &Registration,
    seconds: i64,
    config: &'a RegistrationConfig,
) -> Mutation<'a> {
    let code = |correct: bool| {
        if correct {
            code_of(current)
        } else {
            WRONG_CODE.to_string()
        }
    };

    match request {
        Request::Verify { correct } => Mutation::new(verify_cmd(&code(*correct), seconds), config),
        Request::Check { correct } => Mutation::new(check_cmd(&code(*correct), seconds), config),
        Request::Resend => Mutation::new(resend_cmd(seconds), config),
        Request::CompleteStudent { correct } => {
            Mutation::new(complete_student_cmd(&code(*correct), seconds), config)
        }
        Request::CompleteStaff { correct } => {
            Mutation::new(complete_staff_cmd(&code(*correct), seconds), config)
        }
    }
}

/// Outcome of replaying a request sequence
struct Replay {
    states: Vec<Registration>,
    history: Vec<RegistrationEvent>,
}

/// Run every request and commit the transitions, checking per-step rules
fn replay(requests: &[(Request, i64)]) -> Result<Replay, TestCaseError> {
    let config = test_config();
    let mut current = loaded(STUDENT_EMAIL);
    let mut history = Vec::new();
    let mut states = vec![current.clone()];
    let mut seconds = 0;

    for (request, delay) in requests {
        seconds += delay;
        let was_completed = current.is_completed();

        let transition = mutation(request, &current, seconds, &config).run(&current);

        if matches!(request, Request::Check { .. }) {
            prop_assert!(
                !transition.is_commit(),
                "check_code must never produce a commit: {:?}",
                transition
            );
        }

        match transition {
            Transition::Commit { mut registration }
            | Transition::CommitAndFail {
                mut registration, ..
            } => {
                prop_assert!(!was_completed, "Completed registrations must not change");
                let events = registration.commit_events();
                prop_assert!(events
                    .iter()
                    .all(|event| event.registration_id() == current.id()));
                history.extend(events);
                current = registration;
            }
            Transition::Unchanged | Transition::Reject(_) => {}
        }

        states.push(current.clone());
    }

    Ok(Replay { states, history })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: The attempt counter never exceeds the configured maximum
    #[test]
    fn prop_attempts_bounded(requests in request_sequence()) {
        let max = test_config().max_code_attempts;
        let replay = replay(&requests)?;

        for state in &replay.states {
            prop_assert!(state.code_attempts() <= max, "attempts {} > {}", state.code_attempts(), max);
        }
    }

    /// Property: Completed is absorbing
    ///
    /// Once a state in the sequence is Completed, every later state is too.
    #[test]
    fn prop_completed_is_absorbing(requests in request_sequence()) {
        let replay = replay(&requests)?;

        let first_completed = replay.states.iter().position(Registration::is_completed);
        if let Some(index) = first_completed {
            prop_assert!(replay.states[index..]
                .iter()
                .all(|state| state.is_status(RegistrationStatus::Completed)));
        }
    }

    /// Property: Structural invariants hold after every committed step
    #[test]
    fn prop_state_invariants_hold(requests in request_sequence()) {
        let replay = replay(&requests)?;

        for state in &replay.states {
            prop_assert_eq!(state.check_invariants(), Ok(()));
        }
    }

    /// Property: A registration completes at most once
    #[test]
    fn prop_single_completion_event(requests in request_sequence()) {
        let replay = replay(&requests)?;

        let completions = replay
            .history
            .iter()
            .filter(|event| event.is_completion())
            .count();

        prop_assert!(completions <= 1, "{} completion events", completions);
        prop_assert_eq!(
            completions == 1,
            replay.states.last().is_some_and(Registration::is_completed)
        );
    }

    /// Property: Active codes stay within the alphabet and configured length
    #[test]
    fn prop_codes_well_formed(requests in request_sequence()) {
        let length = test_config().code_length;
        let replay = replay(&requests)?;

        for state in &replay.states {
            let code = state.verification_code().as_str();
            prop_assert_eq!(code.len(), length);
            prop_assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    /// Property: Each committed event is caused by the one before it
    #[test]
    fn prop_causation_chain_within_commit(requests in request_sequence()) {
        let replay = replay(&requests)?;

        for pair in replay.history.windows(2) {
            if let Some(cause) = pair[1].causation_id() {
                prop_assert!(replay.history.iter().any(|event| event.event_id() == cause));
            }
            prop_assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    /// Property: Email normalization is idempotent
    #[test]
    fn prop_email_normalization_idempotent(
        local in "[A-Za-z0-9]{1,20}",
        domain in "[A-Za-z]{1,20}\\.[A-Za-z]{2,6}",
        padding in " {0,3}",
    ) {
        let raw = format!("{padding}{local}@{domain}{padding}");
        let email = Email::new(&raw).expect("generated email is valid");
        let again = Email::new(email.as_str()).expect("normalized email is valid");

        prop_assert_eq!(&email, &again);
        prop_assert_eq!(email.as_str(), raw.trim().to_lowercase());
    }
}
