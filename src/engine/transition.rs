//! Transitions: a guarded edge between two states with optional hooks.

use crate::core::{Guard, State};
use std::fmt;
use std::sync::Arc;

/// Error type returned by `on` and `after` hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pre-commit hook. May mutate the entity; must not persist it.
pub type OnHook<S, E, A> =
    Arc<dyn Fn(&mut E, &A, &HookContext<'_, S>) -> Result<(), HookError> + Send + Sync>;

/// Post-commit hook. Sees the entity as it was committed.
pub type AfterHook<S, E, A> =
    Arc<dyn Fn(&E, &A, &HookContext<'_, S>) -> Result<(), HookError> + Send + Sync>;

/// What a hook can observe about the transition it runs in.
///
/// `state()` is what the machine reports as its current state while the hook
/// runs. For `on` hooks that depends on
/// [`StateVisibility`](crate::config::StateVisibility); for `after` hooks it
/// is always the committed `to` state.
#[derive(Debug)]
pub struct HookContext<'a, S: State> {
    event: &'a str,
    from: &'a S,
    to: &'a S,
    state: &'a S,
}

impl<'a, S: State> HookContext<'a, S> {
    pub(crate) fn new(event: &'a str, from: &'a S, to: &'a S, state: &'a S) -> Self {
        Self {
            event,
            from,
            to,
            state,
        }
    }

    pub fn event(&self) -> &str {
        self.event
    }

    pub fn from(&self) -> &S {
        self.from
    }

    pub fn to(&self) -> &S {
        self.to
    }

    pub fn state(&self) -> &S {
        self.state
    }
}

/// A candidate outcome of firing an event.
///
/// Transitions are immutable once registered. Hooks live behind `Arc`, so
/// cloning a transition (and the registry holding it) is cheap.
pub struct Transition<S: State, E, A> {
    pub from: S,
    pub to: S,
    pub guard: Option<Guard<S, E, A>>,
    pub on: Option<OnHook<S, E, A>>,
    pub after: Option<AfterHook<S, E, A>>,
}

impl<S: State, E, A> Transition<S, E, A> {
    /// An unguarded transition without hooks.
    pub fn new(from: S, to: S) -> Self {
        Self {
            from,
            to,
            guard: None,
            on: None,
            after: None,
        }
    }

    /// Whether this transition applies from `current` for these arguments.
    ///
    /// A missing guard always accepts.
    pub fn can_fire(&self, current: &S, entity: &E, args: &A) -> bool {
        if *current != self.from {
            return false;
        }

        self.guard
            .as_ref()
            .is_none_or(|g| g.check(current, entity, args))
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }
}

impl<S: State, E, A> Clone for Transition<S, E, A> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
            on: self.on.clone(),
            after: self.after.clone(),
        }
    }
}

impl<S: State, E, A> fmt::Debug for Transition<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .field("on", &self.on.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}
