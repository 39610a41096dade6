use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::collection::{FiniteActions, FiniteStates};
use crate::core::entity::{Action, State};
use crate::core::horizon::Horizon;
use crate::core::policy::format::{self, Record};
use crate::error::{Error, Result};

/// A deterministic state to action mapping, one per epoch.
///
/// Infinite-horizon policies have a single (stationary) epoch, 0. Finite-horizon policies
/// have one epoch per decision, epoch 0 being the first.
#[derive(Debug, Clone)]
pub struct PolicyMap {
    horizon: Horizon,
    epochs: Vec<BTreeMap<State, Action>>,
    current: usize,
}

impl PolicyMap {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            epochs: vec![BTreeMap::new(); horizon.policy_slots()],
            current: 0,
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn set(&mut self, epoch: usize, state: State, action: Action) -> Result<()> {
        let slots = self.epochs.len();
        let mapping = self
            .epochs
            .get_mut(epoch)
            .ok_or_else(|| epoch_out_of_range(epoch, slots))?;
        mapping.insert(state, action);
        Ok(())
    }

    pub fn get(&self, epoch: usize, state: &State) -> Result<&Action> {
        let mapping = self
            .epochs
            .get(epoch)
            .ok_or_else(|| epoch_out_of_range(epoch, self.epochs.len()))?;
        mapping.get(state).ok_or_else(|| {
            Error::PolicyUndefined(format!("no action for state '{state}' at epoch {epoch}"))
        })
    }

    /// The action for `state` at the execution cursor. Finite-horizon policies advance one
    /// epoch per call and fail once every epoch has been used.
    pub fn next(&mut self, state: &State) -> Result<Action> {
        let action = self.get(self.current, state)?.clone();
        if self.horizon.is_finite() {
            self.current += 1;
        }
        Ok(action)
    }

    /// Rewinds the execution cursor to epoch 0.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Number of (epoch, state) mappings.
    pub fn len(&self) -> usize {
        self.epochs.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `state : action` lines; `horizon: n` switches to epoch `n - 1`.
    pub fn load<R: BufRead>(
        reader: R,
        states: &FiniteStates,
        actions: &FiniteActions,
        horizon: Horizon,
    ) -> Result<Self> {
        let mut policy = Self::new(horizon);
        let mut epoch = 0;
        for line in format::read_lines(reader)? {
            match line.record {
                Record::Horizon(n) => {
                    epoch = format::check_epoch(line.number, n, policy.epochs.len())?;
                }
                Record::Tokens(tokens) => {
                    let [state, action] = tokens.as_slice() else {
                        return Err(Error::parse(line.number, "expected `state : action`"));
                    };
                    let state = format::lookup(states, state, line.number)?;
                    let action = format::lookup(actions, action, line.number)?;
                    policy.set(epoch, state, action)?;
                }
            }
        }
        Ok(policy)
    }

    pub fn load_file<P: AsRef<Path>>(
        path: P,
        states: &FiniteStates,
        actions: &FiniteActions,
        horizon: Horizon,
    ) -> Result<Self> {
        Self::load(BufReader::new(File::open(path)?), states, actions, horizon)
    }

    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "# state : action")?;
        for (epoch, mapping) in self.epochs.iter().enumerate() {
            if self.horizon.is_finite() {
                writeln!(writer, "horizon: {}", epoch + 1)?;
            }
            for (state, action) in mapping {
                writeln!(writer, "{state} : {action}")?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(BufWriter::new(File::create(path)?))
    }
}

fn epoch_out_of_range(epoch: usize, slots: usize) -> Error {
    Error::PolicyUndefined(format!(
        "epoch {epoch} is outside the policy's {slots} epochs"
    ))
}
