use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::belief::BeliefState;
use crate::core::collection::{FiniteActions, FiniteStates};
use crate::core::entity::Action;
use crate::core::horizon::Horizon;
use crate::core::policy::alpha_vector::AlphaVector;
use crate::core::policy::format::{self, Record};
use crate::error::{Error, Result};

/// A POMDP policy given by one set of alpha vectors (Γ) per epoch.
///
/// The action at a belief is the action of the vector with the largest dot product.
/// Epoch 0 is the first decision of a finite horizon, or the single stationary set of an
/// infinite one.
#[derive(Debug, Clone)]
pub struct PolicyAlphaVectors {
    horizon: Horizon,
    gammas: Vec<Vec<AlphaVector>>,
    current: usize,
}

impl PolicyAlphaVectors {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            gammas: vec![Vec::new(); horizon.policy_slots()],
            current: 0,
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Replaces the Γ set of one epoch.
    pub fn set(&mut self, epoch: usize, gamma: Vec<AlphaVector>) -> Result<()> {
        let slots = self.gammas.len();
        let slot = self
            .gammas
            .get_mut(epoch)
            .ok_or_else(|| epoch_out_of_range(epoch, slots))?;
        *slot = gamma;
        Ok(())
    }

    pub fn gamma(&self, epoch: usize) -> Result<&[AlphaVector]> {
        self.gammas
            .get(epoch)
            .map(Vec::as_slice)
            .ok_or_else(|| epoch_out_of_range(epoch, self.gammas.len()))
    }

    /// The best value at `belief` and the action achieving it. Ties go to the earliest vector.
    pub fn value(&self, epoch: usize, belief: &BeliefState) -> Result<(f64, &Action)> {
        let gamma = self.gamma(epoch)?;
        let mut best: Option<(f64, &Action)> = None;
        for alpha in gamma {
            let value = alpha.dot(belief);
            if best.map_or(true, |(top, _)| value > top) {
                best = Some((value, alpha.action()));
            }
        }
        best.ok_or_else(|| {
            Error::PolicyUndefined(format!("no alpha vectors at epoch {epoch}"))
        })
    }

    pub fn get(&self, epoch: usize, belief: &BeliefState) -> Result<&Action> {
        self.value(epoch, belief).map(|(_, action)| action)
    }

    /// The action for `belief` at the execution cursor; finite horizons advance one epoch
    /// per call.
    pub fn next(&mut self, belief: &BeliefState) -> Result<Action> {
        let action = self.get(self.current, belief)?.clone();
        if self.horizon.is_finite() {
            self.current += 1;
        }
        Ok(action)
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Reads `action : state : value : state : value ...` lines.
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
                    epoch = format::check_epoch(line.number, n, policy.gammas.len())?;
                }
                Record::Tokens(tokens) => {
                    if tokens.len() % 2 == 0 {
                        return Err(Error::parse(
                            line.number,
                            "expected `action : state : value ...`",
                        ));
                    }
                    let action = format::lookup(actions, &tokens[0], line.number)?;
                    let mut alpha = AlphaVector::new(action);
                    for pair in tokens[1..].chunks(2) {
                        let state = format::lookup(states, &pair[0], line.number)?;
                        let value: f64 = pair[1].parse().map_err(|_| {
                            Error::parse(line.number, format!("invalid value '{}'", pair[1]))
                        })?;
                        alpha.set(state, value);
                    }
                    policy.gammas[epoch].push(alpha);
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
        writeln!(writer, "# action : state : value : ...")?;
        for (epoch, gamma) in self.gammas.iter().enumerate() {
            if self.horizon.is_finite() {
                writeln!(writer, "horizon: {}", epoch + 1)?;
            }
            for alpha in gamma {
                write!(writer, "{}", alpha.action())?;
                for (state, value) in alpha.iter() {
                    write!(writer, " : {state} : {value}")?;
                }
                writeln!(writer)?;
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
