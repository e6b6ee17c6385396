//! The state machine and its event-firing protocol.

use crate::checkpoint::MachineMetadata;
use crate::config::{MachineConfig, StateVisibility};
use crate::core::{State, StateHistory, TransitionRecord};
use crate::engine::commit::{CommitStep, NoopCommit};
use crate::engine::error::{FireError, TransitionCause};
use crate::engine::event::EventRegistry;
use crate::engine::transition::HookContext;
use chrono::Utc;
use std::fmt;
use tracing::{debug, info, warn};

/// Outcome of a successful `fire` call.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<S: State> {
    pub event: String,
    pub from: S,
    pub to: S,
}

/// Finite state machine for a single entity.
///
/// `S` is the state type, `E` the entity whose fields hooks mutate and `A`
/// the argument type shared by all events of the machine (usually an enum
/// with one variant per event). The entity is passed to every `fire` call
/// rather than captured by hooks.
///
/// A machine is meant to live for one unit of work: hydrate it from the
/// persisted state, fire once, discard it. It does no locking of its own.
pub struct StateMachine<S: State, E, A> {
    pub(crate) current: S,
    pub(crate) registry: EventRegistry<S, E, A>,
    pub(crate) config: MachineConfig,
    pub(crate) history: StateHistory<S>,
    pub(crate) metadata: MachineMetadata,
}

impl<S: State, E, A> StateMachine<S, E, A> {
    /// Create a machine in `initial` with no events registered.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            registry: EventRegistry::new(),
            config: MachineConfig::default(),
            history: StateHistory::new(),
            metadata: MachineMetadata::default(),
        }
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_events(mut self, registry: EventRegistry<S, E, A>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the whole event registry.
    pub fn set_events(&mut self, registry: EventRegistry<S, E, A>) {
        self.registry = registry;
    }

    /// Current state.
    pub fn state(&self) -> &S {
        &self.current
    }

    pub fn events(&self) -> &EventRegistry<S, E, A> {
        &self.registry
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    pub fn metadata(&self) -> &MachineMetadata {
        &self.metadata
    }

    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }
}

impl<S: State, E, A> fmt::Debug for StateMachine<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("history", &self.history)
            .finish()
    }
}

/// Restores the origin state and the entity snapshot when dropped armed.
///
/// Covers both error returns and unwinding out of an `on` hook or a commit
/// step.
struct Rollback<'a, S: State, E> {
    current: &'a mut S,
    entity: &'a mut E,
    from: S,
    snapshot: Option<E>,
}

impl<'a, S: State, E: Clone> Rollback<'a, S, E> {
    fn arm(current: &'a mut S, entity: &'a mut E) -> Self {
        let from = current.clone();
        let snapshot = Some(entity.clone());
        Self {
            current,
            entity,
            from,
            snapshot,
        }
    }

    fn disarm(mut self) {
        self.snapshot = None;
    }
}

impl<S: State, E> Drop for Rollback<'_, S, E> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.current = self.from.clone();
            *self.entity = snapshot;
        }
    }
}

impl<S: State, E: Clone, A> StateMachine<S, E, A> {
    /// Fire `event` against `entity` without an external store.
    ///
    /// See [`fire_with_commit`](Self::fire_with_commit) for the protocol.
    pub fn fire(&mut self, entity: &mut E, event: &str, args: &A) -> Result<Fired<S>, FireError<S>> {
        self.fire_with_commit(entity, event, args, &mut NoopCommit)
    }

    /// Fire `event` and persist the result through `commit`.
    ///
    /// 1. The first transition of the event whose `from` equals the current
    ///    state and whose guard accepts is selected. None selected is
    ///    `NoTransitionForEvent`.
    /// 2. The `on` hook runs. With [`StateVisibility::Target`] the machine
    ///    already reports `to` while it runs.
    /// 3. `commit` persists `to` and the entity.
    /// 4. The `after` hook runs.
    ///
    /// If step 2 or 3 fails both the state and the entity are restored to
    /// their values before the call. A failing `after` hook is reported as
    /// `AfterHookFailed` and the committed state stands.
    pub fn fire_with_commit<C>(
        &mut self,
        entity: &mut E,
        event: &str,
        args: &A,
        commit: &mut C,
    ) -> Result<Fired<S>, FireError<S>>
    where
        C: CommitStep<S, E> + ?Sized,
    {
        let Self {
            current,
            registry,
            config,
            history,
            metadata,
        } = self;

        let Some(registered) = registry.get(event) else {
            debug!(event, "event not registered");
            return Err(FireError::EventNotFound {
                event: event.to_string(),
            });
        };

        let Some(transition) = registered.select(current, entity, args) else {
            debug!(event, state = current.name(), "no transition accepts event");
            metadata.note_failed(event);
            return Err(FireError::NoTransitionForEvent {
                event: event.to_string(),
                state: current.clone(),
            });
        };

        let from = current.clone();
        let to = transition.to.clone();
        let mut pending = Rollback::arm(&mut *current, &mut *entity);

        if config.state_visibility == StateVisibility::Target {
            *pending.current = to.clone();
        }

        let on_result = match &transition.on {
            Some(on) => on(
                &mut *pending.entity,
                args,
                &HookContext::new(event, &from, &to, &*pending.current),
            ),
            None => Ok(()),
        };

        let rollback_cause = match on_result {
            Err(err) => Some(TransitionCause::Hook(err)),
            Ok(()) => commit
                .commit(&to, &*pending.entity)
                .err()
                .map(TransitionCause::Commit),
        };

        if let Some(cause) = rollback_cause {
            drop(pending);
            metadata.note_failed(event);
            warn!(
                event,
                from = from.name(),
                to = to.name(),
                error = %cause,
                "transition rolled back"
            );
            return Err(FireError::TransitionFailed {
                event: event.to_string(),
                from,
                to,
                cause,
            });
        }
        pending.disarm();

        *current = to.clone();
        if config.record_history {
            *history = history.record(TransitionRecord {
                event: event.to_string(),
                from: from.clone(),
                to: to.clone(),
                timestamp: Utc::now(),
            });
        }
        metadata.note_fired(event);
        info!(event, from = from.name(), to = to.name(), "transition committed");

        if let Some(after) = &transition.after {
            if let Err(cause) = after(&*entity, args, &HookContext::new(event, &from, &to, current)) {
                warn!(
                    event,
                    from = from.name(),
                    to = to.name(),
                    error = %cause,
                    "after hook failed; transition stays committed"
                );
                return Err(FireError::AfterHookFailed {
                    event: event.to_string(),
                    from,
                    to,
                    cause,
                });
            }
        }

        Ok(Fired {
            event: event.to_string(),
            from,
            to,
        })
    }
}
