use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::collection::{FiniteActions, FiniteObservations};
use crate::core::entity::{Action, Observation};
use crate::core::policy::format::{self, Record};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Node {
    action: Option<Action>,
    children: Vec<(Observation, usize)>,
}

/// A finite-horizon policy over observation histories.
///
/// The root holds the first action; every non-leaf node has one child per observation.
/// The tree is generated eagerly with depth equal to the horizon.
#[derive(Debug, Clone)]
pub struct PolicyTree {
    horizon: usize,
    nodes: Vec<Node>,
    cursor: Option<usize>,
}

impl PolicyTree {
    /// Generates an empty tree of the given depth branching on every observation.
    pub fn new(observations: &FiniteObservations, horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(Error::InvalidDefinition(
                "a policy tree needs a horizon of at least one".into(),
            ));
        }

        let mut nodes = vec![Node {
            action: None,
            children: Vec::new(),
        }];
        let mut frontier = vec![0];
        for _ in 1..horizon {
            let mut next_frontier = Vec::with_capacity(frontier.len() * observations.len());
            for parent in frontier {
                for observation in observations {
                    let child = nodes.len();
                    nodes.push(Node {
                        action: None,
                        children: Vec::new(),
                    });
                    nodes[parent].children.push((observation.clone(), child));
                    next_frontier.push(child);
                }
            }
            frontier = next_frontier;
        }

        Ok(Self {
            horizon,
            nodes,
            cursor: Some(0),
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets the action taken after the given observation history (empty for the root).
    pub fn set(&mut self, history: &[Observation], action: Action) -> Result<()> {
        let node = self.locate(history)?;
        self.nodes[node].action = Some(action);
        Ok(())
    }

    pub fn get(&self, history: &[Observation]) -> Result<&Action> {
        let node = self.locate(history)?;
        self.nodes[node].action.as_ref().ok_or_else(|| {
            Error::PolicyUndefined(format!("no action after history {}", describe(history)))
        })
    }

    /// The action at the execution cursor.
    pub fn current(&self) -> Result<&Action> {
        let node = self.cursor.ok_or_else(exhausted)?;
        self.nodes[node]
            .action
            .as_ref()
            .ok_or_else(|| Error::PolicyUndefined("no action at the current node".into()))
    }

    /// Returns the action of the node under the cursor (the one taken before `observation`
    /// arrived) and follows the edge labelled `observation`. At a leaf the cursor is
    /// exhausted afterwards.
    pub fn next(&mut self, observation: &Observation) -> Result<Action> {
        let node = self.cursor.ok_or_else(exhausted)?;
        let action = self.current()?.clone();
        let children = &self.nodes[node].children;
        if children.is_empty() {
            self.cursor = None;
        } else {
            let child = children
                .iter()
                .find(|(label, _)| label == observation)
                .map(|&(_, child)| child)
                .ok_or_else(|| {
                    Error::PolicyUndefined(format!("observation '{observation}' has no branch"))
                })?;
            self.cursor = Some(child);
        }
        Ok(action)
    }

    /// Moves the execution cursor back to the root.
    pub fn reset(&mut self) {
        self.cursor = Some(0);
    }

    fn locate(&self, history: &[Observation]) -> Result<usize> {
        let mut node = 0;
        for observation in history {
            node = self.nodes[node]
                .children
                .iter()
                .find(|(label, _)| label == observation)
                .map(|&(_, child)| child)
                .ok_or_else(|| {
                    Error::PolicyUndefined(format!(
                        "history {} leaves the tree",
                        describe(history)
                    ))
                })?;
        }
        Ok(node)
    }

    /// Reads `z1 : z2 : ... : action` lines; the root line is a lone action.
    pub fn load<R: BufRead>(
        reader: R,
        actions: &FiniteActions,
        observations: &FiniteObservations,
        horizon: usize,
    ) -> Result<Self> {
        let mut tree = Self::new(observations, horizon)?;
        for line in format::read_lines(reader)? {
            match line.record {
                Record::Horizon(epoch) => {
                    if epoch + 1 != horizon {
                        return Err(Error::parse(
                            line.number,
                            format!("tree has horizon {horizon}, file says {}", epoch + 1),
                        ));
                    }
                }
                Record::Tokens(tokens) => {
                    let Some((action, history)) = tokens.split_last() else {
                        return Err(Error::parse(line.number, "missing action"));
                    };
                    if history.len() >= horizon {
                        return Err(Error::parse(
                            line.number,
                            format!("history of {} observations is too deep", history.len()),
                        ));
                    }
                    let history = history
                        .iter()
                        .map(|name| format::lookup(observations, name, line.number))
                        .collect::<Result<Vec<_>>>()?;
                    let action = format::lookup(actions, action, line.number)?;
                    tree.set(&history, action)?;
                }
            }
        }
        Ok(tree)
    }

    pub fn load_file<P: AsRef<Path>>(
        path: P,
        actions: &FiniteActions,
        observations: &FiniteObservations,
        horizon: usize,
    ) -> Result<Self> {
        Self::load(
            BufReader::new(File::open(path)?),
            actions,
            observations,
            horizon,
        )
    }

    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "# observation : ... : action")?;
        writeln!(writer, "horizon: {}", self.horizon)?;
        let mut history = Vec::new();
        self.save_node(&mut writer, 0, &mut history)?;
        writer.flush()?;
        Ok(())
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(BufWriter::new(File::create(path)?))
    }

    fn save_node<W: Write>(
        &self,
        writer: &mut W,
        node: usize,
        history: &mut Vec<String>,
    ) -> Result<()> {
        if let Some(action) = &self.nodes[node].action {
            if history.is_empty() {
                writeln!(writer, "{action}")?;
            } else {
                writeln!(writer, "{} : {action}", history.join(" : "))?;
            }
        }
        for (observation, child) in &self.nodes[node].children {
            history.push(observation.to_string());
            self.save_node(writer, *child, history)?;
            history.pop();
        }
        Ok(())
    }
}

fn exhausted() -> Error {
    Error::PolicyUndefined("policy tree is exhausted".into())
}

fn describe(history: &[Observation]) -> String {
    let names: Vec<&str> = history.iter().map(Observation::name).collect();
    format!("[{}]", names.join(", "))
}
