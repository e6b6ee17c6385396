//! Errors returned by [`StateMachine::fire`](crate::engine::StateMachine::fire).

use crate::core::State;
use crate::engine::transition::HookError;
use crate::store::StoreError;
use thiserror::Error;

/// Why a selected transition was rolled back.
#[derive(Debug, Error)]
pub enum TransitionCause {
    #[error("on hook failed: {0}")]
    Hook(#[source] HookError),

    #[error("commit failed: {0}")]
    Commit(#[source] StoreError),
}

/// Failure of a single `fire` call.
///
/// Every variant except `AfterHookFailed` leaves the machine in the state it
/// had before the call.
#[derive(Debug, Error)]
pub enum FireError<S: State> {
    #[error("event '{event}' is not registered")]
    EventNotFound { event: String },

    #[error("event '{event}' has no transition from state {state:?}")]
    NoTransitionForEvent { event: String, state: S },

    #[error("event '{event}': transition from {from:?} to {to:?} rolled back: {cause}")]
    TransitionFailed {
        event: String,
        from: S,
        to: S,
        #[source]
        cause: TransitionCause,
    },

    #[error("event '{event}': after hook failed once {from:?} -> {to:?} was committed: {cause}")]
    AfterHookFailed {
        event: String,
        from: S,
        to: S,
        #[source]
        cause: HookError,
    },
}

impl<S: State> FireError<S> {
    /// Name of the event that was fired.
    pub fn event(&self) -> &str {
        match self {
            Self::EventNotFound { event }
            | Self::NoTransitionForEvent { event, .. }
            | Self::TransitionFailed { event, .. }
            | Self::AfterHookFailed { event, .. } => event,
        }
    }

    /// Whether the state change was committed despite the error.
    ///
    /// Only an `after` hook failure leaves a committed transition behind. It
    /// is remedied by retrying the after-effect, not by firing again.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::AfterHookFailed { .. })
    }

    /// Whether firing the same event again may succeed without a state change.
    ///
    /// True only for rollbacks caused by a transient store failure such as
    /// lock contention. Hook failures are opaque and treated as permanent.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::TransitionFailed {
                cause: TransitionCause::Commit(err),
                ..
            } => err.is_transient(),
            _ => false,
        }
    }
}
