//! One `fire` call wrapped in load-lock-commit-rollback.

use super::{LockToken, Locked, StoreError, TransactionalStore};
use crate::config::MachineConfig;
use crate::core::State;
use crate::engine::{CommitStep, EventRegistry, FireError, Fired, StateMachine};
use std::marker::PhantomData;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of a unit of work whose transition was committed.
#[derive(Clone, Debug, PartialEq)]
pub struct Committed<S: State, E> {
    pub fired: Fired<S>,
    /// The entity as it was committed
    pub entity: E,
}

#[derive(Debug, Error)]
pub enum UnitOfWorkError<S: State> {
    #[error("could not load entity for update: {0}")]
    Load(#[source] StoreError),

    #[error("entity '{entity_id}': {error}")]
    Fire {
        entity_id: String,
        #[source]
        error: FireError<S>,
    },
}

impl<S: State> UnitOfWorkError<S> {
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Load(err) => err.is_transient(),
            Self::Fire { error, .. } => error.is_retriable(),
        }
    }

    /// Whether the transition was committed before the error occurred.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Fire { error, .. } if error.is_committed())
    }

    pub fn fire_error(&self) -> Option<&FireError<S>> {
        match self {
            Self::Fire { error, .. } => Some(error),
            Self::Load(_) => None,
        }
    }
}

/// Commit step that owns the row lock for one unit of work.
///
/// Dropped without a successful commit, it rolls the lock back. That includes
/// unwinding out of a hook.
struct StoreCommit<'a, S: State, E, St: TransactionalStore<S, E> + ?Sized> {
    store: &'a St,
    token: Option<LockToken>,
    committed: bool,
    _phantom: PhantomData<fn() -> (S, E)>,
}

impl<'a, S, E, St> StoreCommit<'a, S, E, St>
where
    S: State,
    St: TransactionalStore<S, E> + ?Sized,
{
    fn new(store: &'a St, token: LockToken) -> Self {
        Self {
            store,
            token: Some(token),
            committed: false,
            _phantom: PhantomData,
        }
    }
}

impl<S, E, St> CommitStep<S, E> for StoreCommit<'_, S, E, St>
where
    S: State,
    St: TransactionalStore<S, E> + ?Sized,
{
    fn commit(&mut self, state: &S, entity: &E) -> Result<(), StoreError> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("row lock already released".to_string()))?;
        self.store.commit(token, state, entity)?;
        self.committed = true;
        Ok(())
    }
}

impl<S, E, St> Drop for StoreCommit<'_, S, E, St>
where
    S: State,
    St: TransactionalStore<S, E> + ?Sized,
{
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Some(token) = self.token.take() {
            debug!(entity_id = token.entity_id(), "releasing uncommitted row lock");
            self.store.rollback(token);
        }
    }
}

/// Drives single `fire` calls against persisted entities.
///
/// Each call loads the entity under its row lock, hydrates a fresh machine at
/// the persisted state, fires once and then either commits (inside the
/// machine's commit step) or rolls back. The lock is never held past the
/// call.
pub struct UnitOfWork<'a, S: State, E, A, St: ?Sized> {
    store: &'a St,
    registry: &'a EventRegistry<S, E, A>,
    config: MachineConfig,
}

impl<'a, S, E, A, St> UnitOfWork<'a, S, E, A, St>
where
    S: State,
    E: Clone,
    St: TransactionalStore<S, E> + ?Sized,
{
    pub fn new(store: &'a St, registry: &'a EventRegistry<S, E, A>) -> Self {
        Self {
            store,
            registry,
            config: MachineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fire(
        &self,
        entity_id: &str,
        event: &str,
        args: &A,
    ) -> Result<Committed<S, E>, UnitOfWorkError<S>> {
        let Locked {
            token,
            state,
            mut entity,
        } = self
            .store
            .load_for_update(entity_id)
            .map_err(UnitOfWorkError::Load)?;

        let mut machine = StateMachine::new(state)
            .with_config(self.config.clone())
            .with_events(self.registry.clone());

        let mut step = StoreCommit::<S, E, St>::new(self.store, token);
        let result = machine.fire_with_commit(&mut entity, event, args, &mut step);
        drop(step);

        match result {
            Ok(fired) => {
                info!(
                    entity_id,
                    event,
                    from = fired.from.name(),
                    to = fired.to.name(),
                    "unit of work committed"
                );
                Ok(Committed { fired, entity })
            }
            Err(error) if error.is_committed() => Err(UnitOfWorkError::Fire {
                entity_id: entity_id.to_string(),
                error,
            }),
            Err(error) => {
                warn!(entity_id, event, %error, "unit of work rolled back");
                Err(UnitOfWorkError::Fire {
                    entity_id: entity_id.to_string(),
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Event, HookContext, HookError, Transition};
    use crate::store::InMemoryStore;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
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

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Transfer {
        authorized: u64,
    }

    fn registry(fail_on: bool) -> EventRegistry<Stage, Transfer, u64> {
        let mut t = Transition::new(Stage::Pending, Stage::Authorized);
        t.on = Some(Arc::new(
            move |xfr: &mut Transfer, amount: &u64, _: &HookContext<'_, Stage>| -> Result<(), HookError> {
                xfr.authorized = *amount;
                if fail_on {
                    Err("declined".into())
                } else {
                    Ok(())
                }
            },
        ));
        EventRegistry::new().with(Event::new("authorize").transition(t))
    }

    fn store() -> InMemoryStore<Stage, Transfer> {
        let store = InMemoryStore::new();
        store.insert("xfr", Stage::Pending, Transfer::default()).unwrap();
        store
    }

    #[test]
    fn committed_unit_persists_state_and_entity() {
        let store = store();
        let registry = registry(false);

        let committed = UnitOfWork::new(&store, &registry)
            .fire("xfr", "authorize", &100)
            .unwrap();

        assert_eq!(committed.fired.to, Stage::Authorized);
        assert_eq!(committed.entity.authorized, 100);
        let record = store.get("xfr").unwrap().unwrap();
        assert_eq!(record.state, Stage::Authorized);
        assert_eq!(record.entity.authorized, 100);
        assert!(!store.is_locked("xfr"));
    }

    #[test]
    fn failed_hook_rolls_back_and_releases_lock() {
        let store = store();
        let registry = registry(true);

        let err = UnitOfWork::new(&store, &registry)
            .fire("xfr", "authorize", &100)
            .unwrap_err();

        assert!(matches!(
            err.fire_error(),
            Some(FireError::TransitionFailed { .. })
        ));
        let record = store.get("xfr").unwrap().unwrap();
        assert_eq!(record.state, Stage::Pending);
        assert_eq!(record.entity.authorized, 0);
        assert!(!store.is_locked("xfr"));
    }

    #[test]
    fn unknown_event_releases_lock() {
        let store = store();
        let registry = registry(false);

        let err = UnitOfWork::new(&store, &registry)
            .fire("xfr", "refund", &1)
            .unwrap_err();

        assert!(matches!(err.fire_error(), Some(FireError::EventNotFound { .. })));
        assert!(!store.is_locked("xfr"));
    }

    #[test]
    fn locked_entity_is_retriable_load_error() {
        let store = store();
        let registry = registry(false);
        let held = store.load_for_update("xfr").unwrap();

        let err = UnitOfWork::new(&store, &registry)
            .fire("xfr", "authorize", &100)
            .unwrap_err();

        assert!(matches!(err, UnitOfWorkError::Load(StoreError::LockContention { .. })));
        assert!(err.is_retriable());

        store.rollback(held.token);
        UnitOfWork::new(&store, &registry)
            .fire("xfr", "authorize", &100)
            .unwrap();
    }

    #[test]
    fn panicking_hook_releases_lock() {
        let store = store();
        let mut t = Transition::new(Stage::Pending, Stage::Authorized);
        t.on = Some(Arc::new(
            |_: &mut Transfer, _: &u64, _: &HookContext<'_, Stage>| -> Result<(), HookError> {
                panic!("hook bug")
            },
        ));
        let registry = EventRegistry::new().with(Event::new("authorize").transition(t));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            UnitOfWork::new(&store, &registry).fire("xfr", "authorize", &100)
        }));

        assert!(outcome.is_err());
        assert!(!store.is_locked("xfr"));
        let record = store.get("xfr").unwrap().unwrap();
        assert_eq!(record.state, Stage::Pending);
        assert_eq!(record.version, 0);
    }
}
