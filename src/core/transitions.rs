use crate::core::collection::{FiniteObservations, FiniteStates};
use crate::core::entity::{Action, ActionKind, Id, Observation, ObservationKind, State, StateKind};
use crate::core::wildcard::{Slot, WildcardTable};

type StateActionState = (Slot<Id<StateKind>>, Slot<Id<ActionKind>>, Slot<Id<StateKind>>);
type ActionStateObservation = (
    Slot<Id<ActionKind>>,
    Slot<Id<StateKind>>,
    Slot<Id<ObservationKind>>,
);

/// State transition probabilities T(s, a, s').
#[derive(Debug, Clone, Default)]
pub struct StateTransitions {
    table: WildcardTable<StateActionState>,
}

impl StateTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets T(s, a, s'). `None` in any position stands for the wildcard. The probability
    /// is clamped to [0, 1].
    pub fn set(
        &mut self,
        state: Option<&State>,
        action: Option<&Action>,
        next_state: Option<&State>,
        probability: f64,
    ) {
        self.table.insert(
            (
                Slot::from_option(state),
                Slot::from_option(action),
                Slot::from_option(next_state),
            ),
            probability.clamp(0.0, 1.0),
        );
    }

    /// T(s, a, s'), resolving wildcards most specific first; 0 when nothing matches.
    pub fn get(&self, state: &State, action: &Action, next_state: &State) -> f64 {
        self.table
            .resolve((Slot::of(state), Slot::of(action), Slot::of(next_state)))
            .unwrap_or(0.0)
    }

    /// Every state reachable from `state` under `action` with positive probability.
    pub fn successors<'a>(
        &self,
        states: &'a FiniteStates,
        state: &State,
        action: &Action,
    ) -> Vec<&'a State> {
        states
            .iter()
            .filter(|next_state| self.get(state, action, next_state) > 0.0)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// Observation probabilities O(a, s', z): the chance of observing `z` after taking `a`
/// and landing in `s'`.
#[derive(Debug, Clone, Default)]
pub struct ObservationTransitions {
    table: WildcardTable<ActionStateObservation>,
}

impl ObservationTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets O(a, s', z). `None` in any position stands for the wildcard. The probability
    /// is clamped to [0, 1].
    pub fn set(
        &mut self,
        previous_action: Option<&Action>,
        state: Option<&State>,
        observation: Option<&Observation>,
        probability: f64,
    ) {
        self.table.insert(
            (
                Slot::from_option(previous_action),
                Slot::from_option(state),
                Slot::from_option(observation),
            ),
            probability.clamp(0.0, 1.0),
        );
    }

    pub fn get(&self, previous_action: &Action, state: &State, observation: &Observation) -> f64 {
        self.table
            .resolve((
                Slot::of(previous_action),
                Slot::of(state),
                Slot::of(observation),
            ))
            .unwrap_or(0.0)
    }

    /// Every observation with positive probability after `previous_action` lands in `state`.
    pub fn available<'a>(
        &self,
        observations: &'a FiniteObservations,
        previous_action: &Action,
        state: &State,
    ) -> Vec<&'a Observation> {
        observations
            .iter()
            .filter(|observation| self.get(previous_action, state, observation) > 0.0)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}
