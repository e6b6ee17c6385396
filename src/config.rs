//! Machine configuration.
//!
//! Configuration is plain serde data so it can be embedded in an
//! application's own settings file. `MachineConfig::from_toml_str` parses a
//! standalone TOML table; every key is optional.
//!
//! ```toml
//! state_visibility = "origin"
//! record_history = true
//! strict_registry = false
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State reported by the machine while a transition's `on` hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateVisibility {
    /// The machine moves to `to` before `on` runs and back to `from` if the
    /// hook or the commit fails. Hooks that derive amounts from the current
    /// state see the destination.
    #[default]
    Target,

    /// The machine stays at `from` until the commit succeeds.
    Origin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub state_visibility: StateVisibility,

    /// Keep a [`StateHistory`](crate::core::StateHistory) of committed transitions
    pub record_history: bool,

    /// Reject registries that fail [`validate`](crate::validation::validate)
    pub strict_registry: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            state_visibility: StateVisibility::default(),
            record_history: true,
            strict_registry: false,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid machine configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl MachineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn with_state_visibility(mut self, visibility: StateVisibility) -> Self {
        self.state_visibility = visibility;
        self
    }

    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_registry = true;
        self
    }
}
