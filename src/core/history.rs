//! History of committed transitions.
//!
//! Only committed transitions are recorded. A transition rolled back by a
//! failing `on` hook or commit never appears; one whose `after` hook failed
//! does, since its state change stands.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of one committed transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// Event that was fired
    pub event: String,
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// `record` returns a new history and leaves the receiver untouched.
///
/// # Example
///
/// ```rust
/// use txfsm::core::{State, StateHistory, TransitionRecord};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Stage { Pending, Authorized, Captured }
///
/// impl State for Stage {
///     fn name(&self) -> &str {
///         match self {
///             Self::Pending => "pending",
///             Self::Authorized => "authorized",
///             Self::Captured => "captured",
///         }
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(TransitionRecord {
///         event: "authorize".to_string(),
///         from: Stage::Pending,
///         to: Stage::Authorized,
///         timestamp: Utc::now(),
///     })
///     .record(TransitionRecord {
///         event: "capture".to_string(),
///         from: Stage::Authorized,
///         to: Stage::Captured,
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec![&Stage::Pending, &Stage::Authorized, &Stage::Captured]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Return a new history with `record` appended.
    pub fn record(&self, record: TransitionRecord<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(record);
        Self { transitions }
    }

    /// States traversed: the first origin, then each destination.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for record in &self.transitions {
            path.push(&record.to);
        }
        path
    }

    /// Time between the first and last committed transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Number of committed transitions caused by `event`.
    pub fn count_for(&self, event: &str) -> usize {
        self.transitions
            .iter()
            .filter(|record| record.event == event)
            .count()
    }

    pub fn transitions(&self) -> &[TransitionRecord<S>] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
