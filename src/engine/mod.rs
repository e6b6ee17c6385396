//! The firing engine: transitions, events and the state machine.
//!
//! A `fire` call selects one transition, runs its `on` hook, commits, then
//! runs its `after` hook. Everything up to and including the commit is
//! rolled back together; the `after` hook is not.

mod commit;
mod error;
mod event;
mod machine;
mod transition;

pub use commit::{CommitStep, NoopCommit};
pub use error::{FireError, TransitionCause};
pub use event::{Event, EventRegistry};
pub use machine::{Fired, StateMachine};
pub use transition::{AfterHook, HookContext, HookError, OnHook, Transition};
