//! State Machine Runtime
//!
//! Typed flat state machines. States and events are small `Copy` enums
//! owned by the caller; the machine only stores the transition table.

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Bounds shared by state and event types
pub trait Label: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> Label for T {}

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from: S,
    pub event: E,
    pub to: S,
}

impl<S: Label, E: Label> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self { from, event, to }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial: S,
    transitions: Vec<Transition<S, E>>,
}

impl<S: Label, E: Label> StateMachineBuilder<S, E> {
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            transitions: Vec::new(),
        }
    }

    /// Add a transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine::new(self.initial, self.transitions)
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current: S,
    transitions: FxHashMap<(S, E), S>,
}

impl<S: Label, E: Label> StateMachine<S, E> {
    /// Create a state machine from an initial state and its transitions
    ///
    /// When several transitions share a `(from, event)` pair the first one
    /// wins.
    pub fn new(initial: S, transitions: Vec<Transition<S, E>>) -> Self {
        let mut table = FxHashMap::default();
        for transition in transitions {
            table
                .entry((transition.from, transition.event))
                .or_insert(transition.to);
        }

        Self {
            current: initial,
            transitions: table,
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current == state
    }

    /// Send an event, returning the new state if a transition fired.
    ///
    /// Self transitions fire but leave the state as is.
    pub fn send(&mut self, event: E) -> Option<S> {
        let from = self.current;
        let to = *self.transitions.get(&(from, event))?;

        self.current = to;
        tracing::trace!(?from, ?event, ?to, "fsm transition");

        Some(to)
    }
}

impl<S: Label, E: Label> Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}
