//! Events and the registry that maps event names to them.

use crate::core::State;
use crate::engine::transition::Transition;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// A named, ordered list of candidate transitions.
///
/// Order is priority: the first transition whose `from` matches and whose
/// guard accepts is the one that fires.
pub struct Event<S: State, E, A> {
    name: String,
    transitions: Vec<Transition<S, E, A>>,
}

impl<S: State, E, A> Event<S, E, A> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
        }
    }

    /// Append a candidate transition (lowest priority so far).
    pub fn transition(mut self, transition: Transition<S, E, A>) -> Self {
        self.transitions.push(transition);
        self
    }

    pub(crate) fn push(&mut self, transition: Transition<S, E, A>) {
        self.transitions.push(transition);
    }

    pub fn with_transitions(name: impl Into<String>, transitions: Vec<Transition<S, E, A>>) -> Self {
        Self {
            name: name.into(),
            transitions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &[Transition<S, E, A>] {
        &self.transitions
    }

    /// Pick the transition that fires from `current`, if any.
    ///
    /// Scans in registration order and stops at the first transition whose
    /// `from` matches and whose guard accepts. Guards of transitions with a
    /// different `from` are never evaluated.
    pub fn select(&self, current: &S, entity: &E, args: &A) -> Option<&Transition<S, E, A>> {
        for (index, transition) in self.transitions.iter().enumerate() {
            if transition.from != *current {
                continue;
            }

            if transition.can_fire(current, entity, args) {
                debug!(
                    event = %self.name,
                    index,
                    from = current.name(),
                    to = transition.to.name(),
                    "selected transition"
                );
                return Some(transition);
            }

            debug!(
                event = %self.name,
                index,
                from = current.name(),
                to = transition.to.name(),
                "guard rejected transition"
            );
        }

        None
    }
}

impl<S: State, E, A> Clone for Event<S, E, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

impl<S: State, E, A> fmt::Debug for Event<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish()
    }
}

/// Event name to event mapping held by a state machine.
///
/// Cloning is cheap enough to hand one registry to every unit of work: only
/// the map and state values are copied, hooks are shared.
pub struct EventRegistry<S: State, E, A> {
    events: HashMap<String, Event<S, E, A>>,
}

impl<S: State, E, A> EventRegistry<S, E, A> {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Register `event`, returning the event it replaced under the same name.
    pub fn insert(&mut self, event: Event<S, E, A>) -> Option<Event<S, E, A>> {
        self.events.insert(event.name.clone(), event)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, event: Event<S, E, A>) -> Self {
        self.insert(event);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Event<S, E, A>> {
        self.events.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// Registered event names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.events.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn events(&self) -> impl Iterator<Item = &Event<S, E, A>> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<S: State, E, A> Default for EventRegistry<S, E, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E, A> Clone for EventRegistry<S, E, A> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<S: State, E, A> fmt::Debug for EventRegistry<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.events.iter()).finish()
    }
}

impl<S: State, E, A> FromIterator<Event<S, E, A>> for EventRegistry<S, E, A> {
    fn from_iter<I: IntoIterator<Item = Event<S, E, A>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for event in iter {
            registry.insert(event);
        }
        registry
    }
}
