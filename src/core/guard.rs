//! Guard predicates for selecting among candidate transitions.
//!
//! A guard decides whether a transition applies to a particular `fire` call.
//! Guards see the origin state, the entity and the call arguments, and must
//! not mutate anything: the number of guards evaluated per call depends on
//! registration order.

use super::state::State;
use std::fmt;
use std::sync::Arc;

type Predicate<S, E, A> = Arc<dyn Fn(&S, &E, &A) -> bool + Send + Sync>;

/// Pure predicate gating a transition.
///
/// # Example
///
/// ```rust
/// use txfsm::core::{Guard, State};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Stage { Authorized }
///
/// impl State for Stage {
///     fn name(&self) -> &str { "authorized" }
/// }
///
/// struct Transfer { authorized: u64 }
///
/// // A partial void must be strictly smaller than what is authorized.
/// let partial = Guard::new(|_: &Stage, xfr: &Transfer, amount: &u64| *amount < xfr.authorized);
///
/// let xfr = Transfer { authorized: 100 };
/// assert!(partial.check(&Stage::Authorized, &xfr, &50));
/// assert!(!partial.check(&Stage::Authorized, &xfr, &100));
/// ```
pub struct Guard<S: State, E, A> {
    predicate: Predicate<S, E, A>,
}

impl<S: State, E, A> Guard<S, E, A> {
    /// Create a guard from a predicate over state, entity and arguments.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S, &E, &A) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Create a guard that only looks at the entity and the arguments.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&E, &A) -> bool + Send + Sync + 'static,
    {
        Self::new(move |_: &S, entity: &E, args: &A| predicate(entity, args))
    }

    /// Evaluate the guard.
    pub fn check(&self, state: &S, entity: &E, args: &A) -> bool {
        (self.predicate)(state, entity, args)
    }
}

impl<S: State, E, A> Clone for Guard<S, E, A> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: State, E, A> fmt::Debug for Guard<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
