//! Problems found in an event registry.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryViolation {
    #[error("event registered with an empty name")]
    EmptyEventName,

    /// An unguarded transition with the same `from` is registered earlier,
    /// so this one can never be selected
    #[error("event '{event}': transition #{shadowed} from '{from}' is unreachable behind unguarded transition #{by}")]
    ShadowedTransition {
        event: String,
        from: String,
        shadowed: usize,
        by: usize,
    },

    #[error("event '{event}': transition #{index} leaves final state '{from}'")]
    LeavesFinalState {
        event: String,
        from: String,
        index: usize,
    },
}
