//! The `State` trait implemented by every lifecycle stage.
//!
//! The engine only ever compares states for equality. Names are used for
//! logging and error messages, and finality feeds registry validation.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A lifecycle stage of a transactional entity.
///
/// States are plain values: the machine clones them into history records and
/// error values, compares them against each transition's `from`, and
/// serializes them into checkpoints and stored records.
///
/// # Example
///
/// ```rust
/// use txfsm::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum TransferState {
///     Pending,
///     Authorized,
///     Captured,
/// }
///
/// impl State for TransferState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Pending => "pending",
///             Self::Authorized => "authorized",
///             Self::Captured => "captured",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Captured)
///     }
/// }
///
/// assert_eq!(TransferState::Authorized.name(), "authorized");
/// assert!(TransferState::Captured.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Name used in logs, errors and publications.
    fn name(&self) -> &str;

    /// Whether no transition is expected to leave this state.
    ///
    /// The engine does not refuse to fire from a final state; strict registry
    /// validation reports transitions that leave one.
    fn is_final(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TransferState {
        Pending,
        Authorized,
        Captured,
        Voided,
    }

    impl State for TransferState {
        fn name(&self) -> &str {
            match self {
                Self::Pending => "pending",
                Self::Authorized => "authorized",
                Self::Captured => "captured",
                Self::Voided => "voided",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Captured | Self::Voided)
        }
    }

    #[test]
    fn name_is_stable_per_variant() {
        assert_eq!(TransferState::Pending.name(), "pending");
        assert_eq!(TransferState::Authorized.name(), "authorized");
        assert_eq!(TransferState::Captured.name(), "captured");
        assert_eq!(TransferState::Voided.name(), "voided");
    }

    #[test]
    fn is_final_identifies_terminal_states() {
        assert!(!TransferState::Pending.is_final());
        assert!(!TransferState::Authorized.is_final());
        assert!(TransferState::Captured.is_final());
        assert!(TransferState::Voided.is_final());
    }

    #[test]
    fn is_final_defaults_to_false() {
        #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
        struct Label(String);

        impl State for Label {
            fn name(&self) -> &str {
                &self.0
            }
        }

        assert!(!Label("anything".to_string()).is_final());
    }

    #[test]
    fn state_survives_json() {
        let json = serde_json::to_string(&TransferState::Authorized).unwrap();
        let back: TransferState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TransferState::Authorized);
    }
}
