use crate::core::entity::{Action, ActionKind, Id, Observation, ObservationKind, State, StateKind};
use crate::core::wildcard::{Slot, WildcardTable};

type SaKey = (Slot<Id<StateKind>>, Slot<Id<ActionKind>>);
type SasKey = (Slot<Id<StateKind>>, Slot<Id<ActionKind>>, Slot<Id<StateKind>>);
type SasoKey = (
    Slot<Id<StateKind>>,
    Slot<Id<ActionKind>>,
    Slot<Id<StateKind>>,
    Slot<Id<ObservationKind>>,
);

/// Running minimum and maximum of every reward written to a table.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, reward: f64) {
        self.min = self.min.min(reward);
        self.max = self.max.max(reward);
    }
}

/// Rewards R(s, a) that do not depend on the successor state.
#[derive(Debug, Clone)]
pub struct SaRewards {
    table: WildcardTable<SaKey>,
    bounds: Bounds,
}

impl SaRewards {
    pub fn new() -> Self {
        Self {
            table: WildcardTable::new(),
            bounds: Bounds::empty(),
        }
    }

    /// Sets R(s, a); `None` stands for the wildcard.
    pub fn set(&mut self, state: Option<&State>, action: Option<&Action>, reward: f64) {
        self.table.insert(
            (Slot::from_option(state), Slot::from_option(action)),
            reward,
        );
        self.bounds.include(reward);
    }

    pub fn get(&self, state: &State, action: &Action) -> f64 {
        self.table
            .resolve((Slot::of(state), Slot::of(action)))
            .unwrap_or(0.0)
    }

    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.bounds = Bounds::empty();
    }
}

impl Default for SaRewards {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewards R(s, a, s').
#[derive(Debug, Clone)]
pub struct SasRewards {
    table: WildcardTable<SasKey>,
    bounds: Bounds,
}

impl SasRewards {
    pub fn new() -> Self {
        Self {
            table: WildcardTable::new(),
            bounds: Bounds::empty(),
        }
    }

    /// Sets R(s, a, s'); `None` stands for the wildcard.
    pub fn set(
        &mut self,
        state: Option<&State>,
        action: Option<&Action>,
        next_state: Option<&State>,
        reward: f64,
    ) {
        self.table.insert(
            (
                Slot::from_option(state),
                Slot::from_option(action),
                Slot::from_option(next_state),
            ),
            reward,
        );
        self.bounds.include(reward);
    }

    pub fn get(&self, state: &State, action: &Action, next_state: &State) -> f64 {
        self.table
            .resolve((Slot::of(state), Slot::of(action), Slot::of(next_state)))
            .unwrap_or(0.0)
    }

    /// Smallest reward ever set; `+inf` if none was set.
    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    /// Largest reward ever set; `-inf` if none was set.
    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.bounds = Bounds::empty();
    }
}

impl Default for SasRewards {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifts R(s, a) to R(s, a, ∗). Wildcarding the successor is tried after every pattern
/// that names it, so each (s, a) pattern resolves exactly as it did in the 2-key table.
impl From<SaRewards> for SasRewards {
    fn from(rewards: SaRewards) -> Self {
        let mut table = WildcardTable::new();
        for ((state, action), reward) in rewards.table.iter() {
            table.insert((state.clone(), action.clone(), Slot::Any), reward);
        }
        Self {
            table,
            bounds: rewards.bounds,
        }
    }
}

/// Rewards R(s, a, s', z).
#[derive(Debug, Clone)]
pub struct SasoRewards {
    table: WildcardTable<SasoKey>,
    bounds: Bounds,
}

impl SasoRewards {
    pub fn new() -> Self {
        Self {
            table: WildcardTable::new(),
            bounds: Bounds::empty(),
        }
    }

    /// Sets R(s, a, s', z); `None` stands for the wildcard.
    pub fn set(
        &mut self,
        state: Option<&State>,
        action: Option<&Action>,
        next_state: Option<&State>,
        observation: Option<&Observation>,
        reward: f64,
    ) {
        self.table.insert(
            (
                Slot::from_option(state),
                Slot::from_option(action),
                Slot::from_option(next_state),
                Slot::from_option(observation),
            ),
            reward,
        );
        self.bounds.include(reward);
    }

    pub fn get(
        &self,
        state: &State,
        action: &Action,
        next_state: &State,
        observation: &Observation,
    ) -> f64 {
        self.table
            .resolve((
                Slot::of(state),
                Slot::of(action),
                Slot::of(next_state),
                Slot::of(observation),
            ))
            .unwrap_or(0.0)
    }

    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.bounds = Bounds::empty();
    }
}

impl Default for SasoRewards {
    fn default() -> Self {
        Self::new()
    }
}
