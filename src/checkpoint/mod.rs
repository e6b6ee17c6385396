//! Checkpoints of a machine's state, history and counters.
//!
//! Hooks and guards are code and cannot be serialized, so resuming a machine
//! takes the checkpoint plus the event registry to reattach.

use crate::core::{State, StateHistory};
use crate::engine::{EventRegistry, StateMachine};
use crate::config::MachineConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Counters kept by a machine across `fire` calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Committed transitions per event
    pub fired: HashMap<String, usize>,

    /// Calls per event that committed nothing (no transition or rolled back)
    pub failed: HashMap<String, usize>,
}

impl Default for MachineMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            fired: HashMap::new(),
            failed: HashMap::new(),
        }
    }
}

impl MachineMetadata {
    pub(crate) fn note_fired(&mut self, event: &str) {
        *self.fired.entry(event.to_string()).or_insert(0) += 1;
        self.updated_at = Utc::now();
    }

    pub(crate) fn note_failed(&mut self, event: &str) {
        *self.failed.entry(event.to_string()).or_insert(0) += 1;
        self.updated_at = Utc::now();
    }

    pub fn fired_count(&self, event: &str) -> usize {
        self.fired.get(event).copied().unwrap_or(0)
    }

    pub fn failed_count(&self, event: &str) -> usize {
        self.failed.get(event).copied().unwrap_or(0)
    }
}

/// Serializable snapshot of a state machine.
/// Does NOT include guards or hooks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State> {
    pub version: u32,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub current_state: S,
    pub history: StateHistory<S>,
    pub metadata: MachineMetadata,
    pub config: MachineConfig,
}

impl<S: State> Checkpoint<S> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(input: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(input)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Check version and that the history ends where the machine is.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        if let Some(last) = self.history.transitions().last() {
            if last.to != self.current_state {
                return Err(CheckpointError::ValidationFailed(format!(
                    "history ends in {:?} but current state is {:?}",
                    last.to, self.current_state
                )));
            }
        }

        Ok(())
    }
}

impl<S: State, E, A> StateMachine<S, E, A> {
    /// Snapshot everything about the machine except its registry.
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            current_state: self.current.clone(),
            history: self.history.clone(),
            metadata: self.metadata.clone(),
            config: self.config.clone(),
        }
    }

    /// Rebuild a machine from a checkpoint and the events to reattach.
    pub fn resume(
        checkpoint: Checkpoint<S>,
        registry: EventRegistry<S, E, A>,
    ) -> Result<Self, CheckpointError> {
        checkpoint.validate()?;

        Ok(Self {
            current: checkpoint.current_state,
            registry,
            config: checkpoint.config,
            history: checkpoint.history,
            metadata: checkpoint.metadata,
        })
    }
}
