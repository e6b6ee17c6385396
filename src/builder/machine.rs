//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::config::MachineConfig;
use crate::core::State;
use crate::engine::{Event, EventRegistry, StateMachine, Transition};
use crate::validation;
use tracing::debug;

/// Builder for constructing state machines with a fluent API.
///
/// Events keep the order in which their transitions were added. With
/// `strict_registry` set in the config, `build` runs
/// [`validate`](crate::validation::validate) and refuses a registry with
/// violations.
pub struct StateMachineBuilder<S: State, E, A> {
    initial: Option<S>,
    events: Vec<Event<S, E, A>>,
    config: MachineConfig,
}

impl<S: State + 'static, E: 'static, A: 'static> StateMachineBuilder<S, E, A> {
    pub fn new() -> Self {
        Self {
            initial: None,
            events: Vec::new(),
            config: MachineConfig::default(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a complete event, replacing any event with the same name.
    pub fn event(mut self, event: Event<S, E, A>) -> Self {
        self.events.retain(|existing| existing.name() != event.name());
        self.events.push(event);
        self
    }

    /// Append a pre-built transition to the named event, creating the event
    /// if needed.
    pub fn add_transition(mut self, event: &str, transition: Transition<S, E, A>) -> Self {
        match self.events.iter_mut().find(|existing| existing.name() == event) {
            Some(existing) => existing.push(transition),
            None => self
                .events
                .push(Event::with_transitions(event, vec![transition])),
        }
        self
    }

    /// Append a transition from a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(
        self,
        event: &str,
        builder: TransitionBuilder<S, E, A>,
    ) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        Ok(self.add_transition(event, transition))
    }

    pub fn build(self) -> Result<StateMachine<S, E, A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let registry: EventRegistry<S, E, A> = self.events.into_iter().collect();

        if self.config.strict_registry {
            let found = validation::violations(&registry.validate());
            if !found.is_empty() {
                return Err(BuildError::InvalidRegistry(found));
            }
        }

        debug!(
            initial = initial.name(),
            events = registry.len(),
            "state machine built"
        );

        Ok(StateMachine::new(initial)
            .with_config(self.config)
            .with_events(registry))
    }
}

impl<S: State + 'static, E: 'static, A: 'static> Default for StateMachineBuilder<S, E, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RegistryViolation;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Stage {
        Pending,
        Authorized,
        Captured,
    }

    impl State for Stage {
        fn name(&self) -> &str {
            match self {
                Self::Pending => "pending",
                Self::Authorized => "authorized",
                Self::Captured => "captured",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Captured)
        }
    }

    type Builder = StateMachineBuilder<Stage, (), ()>;

    #[test]
    fn builder_requires_initial_state() {
        let result = Builder::new().build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn machine_without_events_is_allowed() {
        let machine = Builder::new().initial(Stage::Pending).build().unwrap();
        assert!(machine.events().is_empty());
    }

    #[test]
    fn transitions_are_grouped_by_event_in_order() {
        let machine = Builder::new()
            .initial(Stage::Pending)
            .transition(
                "advance",
                TransitionBuilder::new().from(Stage::Pending).to(Stage::Authorized),
            )
            .unwrap()
            .transition(
                "advance",
                TransitionBuilder::new().from(Stage::Authorized).to(Stage::Captured),
            )
            .unwrap()
            .build()
            .unwrap();

        let event = machine.events().get("advance").unwrap();
        assert_eq!(event.transitions().len(), 2);
        assert_eq!(event.transitions()[0].to, Stage::Authorized);
        assert_eq!(event.transitions()[1].to, Stage::Captured);
    }

    #[test]
    fn transition_builder_errors_propagate() {
        let result = Builder::new()
            .initial(Stage::Pending)
            .transition("advance", TransitionBuilder::new().from(Stage::Pending));

        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn event_replaces_same_name() {
        let machine = Builder::new()
            .initial(Stage::Pending)
            .add_transition("capture", Transition::new(Stage::Authorized, Stage::Captured))
            .event(Event::new("capture"))
            .build()
            .unwrap();

        assert_eq!(machine.events().get("capture").unwrap().transitions().len(), 0);
    }

    #[test]
    fn strict_config_rejects_invalid_registry() {
        let result = Builder::new()
            .initial(Stage::Pending)
            .config(MachineConfig::default().strict())
            .add_transition("reopen", Transition::new(Stage::Captured, Stage::Pending))
            .build();

        match result {
            Err(BuildError::InvalidRegistry(found)) => {
                assert_eq!(found.len(), 1);
                assert!(matches!(found[0], RegistryViolation::LeavesFinalState { .. }));
            }
            _ => panic!("Expected InvalidRegistry"),
        }
    }

    #[test]
    fn lenient_config_accepts_same_registry() {
        let machine = Builder::new()
            .initial(Stage::Pending)
            .add_transition("reopen", Transition::new(Stage::Captured, Stage::Pending))
            .build();

        assert!(machine.is_ok());
    }
}
