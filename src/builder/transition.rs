//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Guard, State};
use crate::engine::{AfterHook, HookContext, HookError, OnHook, Transition};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// `from` and `to` are required; the guard and both hooks are optional.
pub struct TransitionBuilder<S: State, E, A> {
    from: Option<S>,
    to: Option<S>,
    guard: Option<Guard<S, E, A>>,
    on: Option<OnHook<S, E, A>>,
    after: Option<AfterHook<S, E, A>>,
}

impl<S: State + 'static, E: 'static, A: 'static> TransitionBuilder<S, E, A> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            guard: None,
            on: None,
            after: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    pub fn guard(mut self, guard: Guard<S, E, A>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Guard on the entity and the arguments.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E, &A) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::when(predicate));
        self
    }

    /// Pre-commit hook over the entity and the arguments.
    pub fn on<F>(self, hook: F) -> Self
    where
        F: Fn(&mut E, &A) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_with_context(move |entity: &mut E, args: &A, _: &HookContext<'_, S>| {
            hook(entity, args)
        })
    }

    /// Pre-commit hook that also inspects the transition being made.
    pub fn on_with_context<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut E, &A, &HookContext<'_, S>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on = Some(Arc::new(hook));
        self
    }

    /// Post-commit hook over the committed entity and the arguments.
    pub fn after<F>(self, hook: F) -> Self
    where
        F: Fn(&E, &A) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after_with_context(move |entity: &E, args: &A, _: &HookContext<'_, S>| {
            hook(entity, args)
        })
    }

    pub fn after_with_context<F>(mut self, hook: F) -> Self
    where
        F: Fn(&E, &A, &HookContext<'_, S>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Use a prebuilt post-commit hook, e.g. from
    /// [`publish_after`](crate::publish::publish_after).
    pub fn after_hook(mut self, hook: AfterHook<S, E, A>) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn build(self) -> Result<Transition<S, E, A>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(Transition {
            from,
            to,
            guard: self.guard,
            on: self.on,
            after: self.after,
        })
    }
}

impl<S: State + 'static, E: 'static, A: 'static> Default for TransitionBuilder<S, E, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Stage {
        Pending,
        Authorized,
    }

    impl State for Stage {
        fn name(&self) -> &str {
            match self {
                Self::Pending => "pending",
                Self::Authorized => "authorized",
            }
        }
    }

    #[derive(Clone, Default)]
    struct Transfer {
        authorized: u64,
    }

    #[test]
    fn builder_requires_from() {
        let result = TransitionBuilder::<Stage, Transfer, u64>::new()
            .to(Stage::Authorized)
            .build();

        assert!(matches!(result, Err(BuildError::MissingFromState)));
    }

    #[test]
    fn builder_requires_to() {
        let result = TransitionBuilder::<Stage, Transfer, u64>::new()
            .from(Stage::Pending)
            .build();

        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn bare_transition_has_no_hooks() {
        let transition = TransitionBuilder::<Stage, Transfer, u64>::new()
            .from(Stage::Pending)
            .to(Stage::Authorized)
            .build()
            .unwrap();

        assert!(transition.guard.is_none());
        assert!(transition.on.is_none());
        assert!(transition.after.is_none());
    }

    #[test]
    fn when_installs_guard() {
        let transition = TransitionBuilder::new()
            .from(Stage::Pending)
            .to(Stage::Authorized)
            .when(|_: &Transfer, amount: &u64| *amount > 0)
            .build()
            .unwrap();

        assert!(transition.can_fire(&Stage::Pending, &Transfer::default(), &10));
        assert!(!transition.can_fire(&Stage::Pending, &Transfer::default(), &0));
    }

    #[test]
    fn on_hook_mutates_entity() {
        let transition = TransitionBuilder::new()
            .from(Stage::Pending)
            .to(Stage::Authorized)
            .on(|xfr: &mut Transfer, amount: &u64| {
                xfr.authorized = *amount;
                Ok(())
            })
            .build()
            .unwrap();

        let mut xfr = Transfer::default();
        let ctx = HookContext::new("authorize", &Stage::Pending, &Stage::Authorized, &Stage::Authorized);
        (transition.on.unwrap())(&mut xfr, &25, &ctx).unwrap();

        assert_eq!(xfr.authorized, 25);
    }
}
