//! Builder API for ergonomic state machine construction.
//!
//! Fluent builders for transitions and machines, plus the `state_enum!`
//! macro for declaring state types without boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Guard, State};
use crate::engine::Transition;

/// Create an unconditional transition with no hooks.
///
/// # Example
///
/// ```
/// use txfsm::builder::simple_transition;
/// use txfsm::state_enum;
///
/// state_enum! {
///     enum Stage {
///         Authorized = "authorized",
///         Captured = "captured",
///     }
///     final: [Captured]
/// }
///
/// let capture = simple_transition::<Stage, (), ()>(Stage::Authorized, Stage::Captured);
/// assert!(!capture.is_guarded());
/// ```
pub fn simple_transition<S, E, A>(from: S, to: S) -> Transition<S, E, A>
where
    S: State,
{
    Transition::new(from, to)
}

/// Create a transition guarded by a predicate over the entity and arguments.
///
/// # Example
///
/// ```
/// use txfsm::builder::guarded_transition;
/// use txfsm::state_enum;
///
/// state_enum! {
///     enum Stage {
///         Authorized = "authorized",
///         PartiallyAuthorized = "partially_authorized",
///     }
/// }
///
/// struct Transfer { authorized: u64 }
///
/// let partial_void = guarded_transition(
///     Stage::Authorized,
///     Stage::PartiallyAuthorized,
///     |xfr: &Transfer, amount: &u64| *amount < xfr.authorized,
/// );
/// assert!(partial_void.is_guarded());
/// ```
pub fn guarded_transition<S, E, A, F>(from: S, to: S, predicate: F) -> Transition<S, E, A>
where
    S: State,
    F: Fn(&E, &A) -> bool + Send + Sync + 'static,
{
    let mut transition = Transition::new(from, to);
    transition.guard = Some(Guard::when(predicate));
    transition
}
