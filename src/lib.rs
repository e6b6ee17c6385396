//! txfsm: a transactional finite state machine engine
//!
//! A machine holds a current state and a registry of named events. Firing an
//! event selects at most one transition, runs its `on` hook, commits, and
//! then runs its `after` hook. A failure anywhere before the commit leaves
//! both the machine state and the entity exactly as they were.
//!
//! # Core Concepts
//!
//! - **State**: Type-safe state representation via the `State` trait
//! - **Guards**: Pure predicates over the origin state, entity and arguments
//! - **Events**: Ordered lists of candidate transitions; first match wins
//! - **Hooks**: `on` runs before the commit and may veto it, `after` runs
//!   once the change is durable
//! - **Stores**: Load-lock-commit-rollback around a single `fire` call
//!
//! # Example
//!
//! ```rust
//! use txfsm::builder::{StateMachineBuilder, TransitionBuilder};
//! use txfsm::state_enum;
//!
//! state_enum! {
//!     enum TransferState {
//!         Pending = "pending",
//!         Authorized = "authorized",
//!         PartiallyAuthorized = "partially_authorized",
//!         Voided = "voided",
//!     }
//!     final: [Voided]
//! }
//!
//! #[derive(Clone, Default)]
//! struct Transfer {
//!     authorized: u64,
//!     voided: u64,
//! }
//!
//! let mut machine = StateMachineBuilder::<TransferState, Transfer, u64>::new()
//!     .initial(TransferState::Pending)
//!     .transition(
//!         "authorize",
//!         TransitionBuilder::new()
//!             .from(TransferState::Pending)
//!             .to(TransferState::Authorized)
//!             .on(|xfr: &mut Transfer, amount: &u64| {
//!                 xfr.authorized = *amount;
//!                 Ok(())
//!             }),
//!     )?
//!     .transition(
//!         "void",
//!         TransitionBuilder::new()
//!             .from(TransferState::Authorized)
//!             .to(TransferState::PartiallyAuthorized)
//!             .when(|xfr: &Transfer, amount: &u64| *amount < xfr.authorized)
//!             .on(|xfr: &mut Transfer, amount: &u64| {
//!                 xfr.voided = *amount;
//!                 xfr.authorized -= *amount;
//!                 Ok(())
//!             }),
//!     )?
//!     .build()?;
//!
//! let mut xfr = Transfer::default();
//! machine.fire(&mut xfr, "authorize", &100)?;
//! machine.fire(&mut xfr, "void", &50)?;
//!
//! assert_eq!(machine.state(), &TransferState::PartiallyAuthorized);
//! assert_eq!((xfr.authorized, xfr.voided), (50, 50));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod engine;
pub mod publish;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use config::{MachineConfig, StateVisibility};
pub use core::{Guard, State, StateHistory, TransitionRecord};
pub use engine::{
    CommitStep, Event, EventRegistry, FireError, Fired, HookContext, HookError, StateMachine,
    Transition,
};
pub use store::{InMemoryStore, TransactionalStore, UnitOfWork};
