//! Static checks over an event registry.
//!
//! The engine accepts any registry: empty events, unreachable transitions
//! and edges out of final states all behave predictably at `fire` time.
//! These checks catch them at construction instead, and use Stillwater's
//! `Validation` so that every problem is reported in one pass.
//!
//! ```rust
//! use txfsm::engine::{Event, EventRegistry, Transition};
//! use txfsm::validation::validate;
//! use txfsm::core::State;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! enum Stage { Authorized, Voided, PartiallyAuthorized }
//!
//! impl State for Stage {
//!     fn name(&self) -> &str {
//!         match self {
//!             Self::Authorized => "authorized",
//!             Self::Voided => "voided",
//!             Self::PartiallyAuthorized => "partially_authorized",
//!         }
//!     }
//! }
//!
//! // The unguarded full void hides the partial void behind it.
//! let registry: EventRegistry<Stage, (), u64> = EventRegistry::new().with(
//!     Event::new("void")
//!         .transition(Transition::new(Stage::Authorized, Stage::Voided))
//!         .transition(Transition::new(Stage::Authorized, Stage::PartiallyAuthorized)),
//! );
//!
//! assert!(validate(&registry).is_failure());
//! ```

pub mod violations;

pub use violations::RegistryViolation;

use crate::core::State;
use crate::engine::{Event, EventRegistry};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of registry validation.
pub type Check = Validation<(), NonEmptyVec<RegistryViolation>>;

/// Validate every event in `registry`, accumulating all violations.
pub fn validate<S: State, E, A>(registry: &EventRegistry<S, E, A>) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    for name in registry.names() {
        if let Some(event) = registry.get(name) {
            checks.push(check_name(event));
            checks.extend(check_shadowing(event));
            checks.extend(check_final_states(event));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Flatten a validation result into the list of violations it carries.
pub fn violations(result: &Check) -> Vec<RegistryViolation> {
    match result {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}

fn check_name<S: State, E, A>(event: &Event<S, E, A>) -> Check {
    if event.name().trim().is_empty() {
        Validation::fail(RegistryViolation::EmptyEventName)
    } else {
        Validation::success(())
    }
}

fn check_shadowing<S: State, E, A>(event: &Event<S, E, A>) -> Vec<Check> {
    let transitions = event.transitions();

    transitions
        .iter()
        .enumerate()
        .filter_map(|(index, transition)| {
            let by = transitions[..index]
                .iter()
                .position(|earlier| earlier.from == transition.from && !earlier.is_guarded())?;
            Some(Validation::fail(RegistryViolation::ShadowedTransition {
                event: event.name().to_string(),
                from: transition.from.name().to_string(),
                shadowed: index,
                by,
            }))
        })
        .collect()
}

fn check_final_states<S: State, E, A>(event: &Event<S, E, A>) -> Vec<Check> {
    event
        .transitions()
        .iter()
        .enumerate()
        .filter(|(_, transition)| transition.from.is_final())
        .map(|(index, transition)| {
            Validation::fail(RegistryViolation::LeavesFinalState {
                event: event.name().to_string(),
                from: transition.from.name().to_string(),
                index,
            })
        })
        .collect()
}

impl<S: State, E, A> EventRegistry<S, E, A> {
    /// See [`validate`].
    pub fn validate(&self) -> Check {
        validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Guard;
    use crate::engine::Transition;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Stage {
        Pending,
        Authorized,
        PartiallyAuthorized,
        Voided,
    }

    impl State for Stage {
        fn name(&self) -> &str {
            match self {
                Self::Pending => "pending",
                Self::Authorized => "authorized",
                Self::PartiallyAuthorized => "partially_authorized",
                Self::Voided => "voided",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Voided)
        }
    }

    struct Transfer {
        authorized: u64,
    }

    type Registry = EventRegistry<Stage, Transfer, u64>;

    fn guarded(from: Stage, to: Stage) -> Transition<Stage, Transfer, u64> {
        let mut t = Transition::new(from, to);
        t.guard = Some(Guard::when(|xfr: &Transfer, amount: &u64| *amount < xfr.authorized));
        t
    }

    #[test]
    fn well_formed_registry_passes() {
        let registry: Registry = EventRegistry::new()
            .with(Event::new("authorize").transition(Transition::new(Stage::Pending, Stage::Authorized)))
            .with(
                Event::new("void")
                    .transition(guarded(Stage::Authorized, Stage::PartiallyAuthorized))
                    .transition(Transition::new(Stage::Authorized, Stage::Voided)),
            );

        assert!(validate(&registry).is_success());
    }

    #[test]
    fn empty_events_are_allowed() {
        let registry: Registry = EventRegistry::new().with(Event::new("noop"));
        assert!(registry.validate().is_success());
    }

    #[test]
    fn unguarded_transition_shadows_later_ones() {
        let registry: Registry = EventRegistry::new().with(
            Event::new("void")
                .transition(Transition::new(Stage::Authorized, Stage::Voided))
                .transition(guarded(Stage::Authorized, Stage::PartiallyAuthorized)),
        );

        let found = violations(&validate(&registry));

        assert_eq!(
            found,
            vec![RegistryViolation::ShadowedTransition {
                event: "void".to_string(),
                from: "authorized".to_string(),
                shadowed: 1,
                by: 0,
            }]
        );
    }

    #[test]
    fn all_violations_are_accumulated() {
        let registry: Registry = EventRegistry::new()
            .with(Event::new(" ").transition(Transition::new(Stage::Pending, Stage::Authorized)))
            .with(
                Event::new("reopen")
                    .transition(Transition::new(Stage::Voided, Stage::Authorized))
                    .transition(Transition::new(Stage::Voided, Stage::Pending)),
            );

        let result = validate(&registry);
        assert!(result.is_failure());

        let found = violations(&result);
        assert_eq!(found.len(), 4);
        assert!(found.contains(&RegistryViolation::EmptyEventName));
        assert_eq!(
            found
                .iter()
                .filter(|v| matches!(v, RegistryViolation::LeavesFinalState { .. }))
                .count(),
            2
        );
        assert!(found
            .iter()
            .any(|v| matches!(v, RegistryViolation::ShadowedTransition { shadowed: 1, by: 0, .. })));
    }

    #[test]
    fn violation_messages_are_descriptive() {
        let violation = RegistryViolation::LeavesFinalState {
            event: "reopen".to_string(),
            from: "voided".to_string(),
            index: 0,
        };
        assert_eq!(
            violation.to_string(),
            "event 'reopen': transition #0 leaves final state 'voided'"
        );
    }
}
