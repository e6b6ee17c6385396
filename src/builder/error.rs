//! Build errors for state machine and transition builders.

use crate::validation::RegistryViolation;
use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("event registry failed validation with {} violation(s)", .0.len())]
    InvalidRegistry(Vec<RegistryViolation>),
}
