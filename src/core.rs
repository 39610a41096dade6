//! Problem representation shared by the MDP and POMDP solvers.

pub mod belief;
pub mod collection;
pub mod entity;
pub mod factored;
pub mod horizon;
pub mod policy;
pub mod rewards;
pub mod transitions;
pub mod wildcard;

pub use belief::BeliefState;
pub use collection::{FiniteActions, FiniteCollection, FiniteObservations, FiniteStates};
pub use entity::{
    Action, ActionKind, Entity, Id, Kind, Observation, ObservationKind, State, StateKind,
};
pub use factored::{
    FactoredCollection, FiniteFactoredStates, FiniteJointActions, FiniteJointObservations,
};
pub use horizon::Horizon;
pub use policy::{cross_sum, AlphaVector, PolicyAlphaVectors, PolicyMap, PolicyTree};
pub use rewards::{SaRewards, SasRewards, SasoRewards};
pub use transitions::{ObservationTransitions, StateTransitions};
pub use wildcard::{Pattern, Slot, WildcardTable};
