//! Core value types: states, guards and transition history.
//!
//! Nothing in this module performs side effects.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, TransitionRecord};
pub use state::State;
