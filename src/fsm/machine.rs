//! Generic named-state machine with conditional transitions
//!
//! States carry lifecycle hooks; transitions carry a condition, a priority,
//! and an automatic flag. Wiring mistakes (duplicate names, unknown
//! endpoints) are fatal configuration errors; asking for a transition that
//! is not currently allowed is not, and simply reports false.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::core::error::{CombatError, Result};
use crate::core::types::TimeMs;

const DEFAULT_HISTORY_LIMIT: usize = 16;

type HookFn<C> = Box<dyn FnMut(&mut C)>;
type UpdateFn<C> = Box<dyn FnMut(&mut C, TimeMs)>;
type ConditionFn<C> = Box<dyn Fn(&C) -> bool>;

/// A named state and its lifecycle hooks
pub struct StateDef<C> {
    name: String,
    on_enter: Option<HookFn<C>>,
    on_exit: Option<HookFn<C>>,
    on_update: Option<UpdateFn<C>>,
}

impl<C> StateDef<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_enter: None,
            on_exit: None,
            on_update: None,
        }
    }

    pub fn on_enter(mut self, hook: impl FnMut(&mut C) + 'static) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    pub fn on_exit(mut self, hook: impl FnMut(&mut C) + 'static) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }

    pub fn on_update(mut self, hook: impl FnMut(&mut C, TimeMs) + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }
}

struct TransitionDef<C> {
    to: String,
    condition: ConditionFn<C>,
    priority: i32,
    automatic: bool,
}

/// Conditional-transition state machine over an opaque context value
pub struct StateMachine<C> {
    states: AHashMap<String, StateDef<C>>,
    transitions: AHashMap<String, Vec<TransitionDef<C>>>,
    current: Option<String>,
    previous: Option<String>,
    time_in_state: TimeMs,
    history: VecDeque<String>,
    history_limit: usize,
    context: Option<C>,
}

impl<C> StateMachine<C> {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            states: AHashMap::new(),
            transitions: AHashMap::new(),
            current: None,
            previous: None,
            time_in_state: 0,
            history: VecDeque::new(),
            history_limit,
            context: None,
        }
    }

    /// Register a state; duplicate names are a wiring bug
    pub fn add_state(&mut self, state: StateDef<C>) -> Result<()> {
        if self.states.contains_key(&state.name) {
            return Err(CombatError::DuplicateState(state.name));
        }
        self.transitions.entry(state.name.clone()).or_default();
        self.states.insert(state.name.clone(), state);
        Ok(())
    }

    /// Register an edge; both endpoints must already exist and an edge may
    /// be registered once per (from, to) pair
    pub fn add_transition(
        &mut self,
        from: &str,
        to: &str,
        condition: impl Fn(&C) -> bool + 'static,
        priority: i32,
        automatic: bool,
    ) -> Result<()> {
        if !self.states.contains_key(from) {
            return Err(CombatError::UnknownState(from.to_string()));
        }
        if !self.states.contains_key(to) {
            return Err(CombatError::UnknownState(to.to_string()));
        }
        let edges = self.transitions.entry(from.to_string()).or_default();
        if edges.iter().any(|edge| edge.to == to) {
            return Err(CombatError::DuplicateTransition(
                from.to_string(),
                to.to_string(),
            ));
        }
        edges.push(TransitionDef {
            to: to.to_string(),
            condition: Box::new(condition),
            priority,
            automatic,
        });
        // Highest priority first; stable so equal priorities keep insertion order
        edges.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(())
    }

    /// Enter the initial state and take ownership of the context
    pub fn start(&mut self, initial: &str, context: C) -> Result<()> {
        if !self.states.contains_key(initial) {
            return Err(CombatError::UnknownState(initial.to_string()));
        }
        self.context = Some(context);
        self.current = Some(initial.to_string());
        self.previous = None;
        self.time_in_state = 0;
        self.history.clear();
        self.fire_enter(initial);
        Ok(())
    }

    /// Advance time-in-state, then fire the highest-priority automatic
    /// transition whose condition holds, or the current state's update hook
    pub fn update(&mut self, dt: TimeMs) {
        let Some(current) = self.current.clone() else {
            return;
        };
        self.time_in_state += dt;

        let target = {
            let Some(ctx) = self.context.as_ref() else {
                return;
            };
            self.transitions.get(&current).and_then(|edges| {
                edges
                    .iter()
                    .find(|edge| edge.automatic && (edge.condition)(ctx))
                    .map(|edge| edge.to.clone())
            })
        };

        if let Some(to) = target {
            self.execute_transition(&current, &to);
            return;
        }

        if let (Some(state), Some(ctx)) = (self.states.get_mut(&current), self.context.as_mut()) {
            if let Some(hook) = state.on_update.as_mut() {
                hook(ctx, dt);
            }
        }
    }

    /// Request a transition; false when no edge to the target currently
    /// allows it. Never an error: invalid requests are routine.
    pub fn transition_to(&mut self, target: &str) -> bool {
        let Some(current) = self.current.clone() else {
            return false;
        };
        if !self.edge_allows(&current, target) {
            return false;
        }
        self.execute_transition(&current, target);
        true
    }

    /// Would `transition_to(target)` succeed right now?
    pub fn can_transition_to(&self, target: &str) -> bool {
        match self.current.as_deref() {
            Some(current) => self.edge_allows(current, target),
            None => false,
        }
    }

    /// Targets reachable right now, highest priority first
    pub fn available_transitions(&self) -> Vec<&str> {
        let (Some(current), Some(ctx)) = (self.current.as_deref(), self.context.as_ref()) else {
            return Vec::new();
        };
        self.transitions
            .get(current)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|edge| (edge.condition)(ctx))
                    .map(|edge| edge.to.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Exit the current state and clear all runtime state
    pub fn stop(&mut self) {
        if let Some(current) = self.current.clone() {
            self.fire_exit(&current);
        }
        self.current = None;
        self.previous = None;
        self.time_in_state = 0;
        self.context = None;
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn previous_state(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn time_in_state(&self) -> TimeMs {
        self.time_in_state
    }

    /// Entered states, oldest first, bounded by the history limit
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    fn edge_allows(&self, from: &str, to: &str) -> bool {
        let Some(ctx) = self.context.as_ref() else {
            return false;
        };
        self.transitions
            .get(from)
            .map(|edges| {
                edges
                    .iter()
                    .any(|edge| edge.to == to && (edge.condition)(ctx))
            })
            .unwrap_or(false)
    }

    fn execute_transition(&mut self, from: &str, to: &str) {
        self.fire_exit(from);
        self.previous = Some(from.to_string());
        self.current = Some(to.to_string());
        self.time_in_state = 0;
        self.history.push_back(to.to_string());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        self.fire_enter(to);
    }

    fn fire_enter(&mut self, name: &str) {
        if let (Some(state), Some(ctx)) = (self.states.get_mut(name), self.context.as_mut()) {
            if let Some(hook) = state.on_enter.as_mut() {
                hook(ctx);
            }
        }
    }

    fn fire_exit(&mut self, name: &str) {
        if let (Some(state), Some(ctx)) = (self.states.get_mut(name), self.context.as_mut()) {
            if let Some(hook) = state.on_exit.as_mut() {
                hook(ctx);
            }
        }
    }
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}
