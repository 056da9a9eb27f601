use crate::building_block::gate::Gate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Circuit descriptor: an ordered gate list in topological order. Wires
/// are named; every wire has exactly one producer (an earlier gate, or
/// the outside world for external inputs) and any number of consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
  pub gates: Vec<Gate>,
}

impl Circuit {
  pub fn new(gates: Vec<Gate>) -> Self {
    Circuit { gates }
  }

  /// Rejects the descriptor before any garbling: arity mismatches,
  /// double-assigned wires and topological-order violations are all
  /// `MalformedCircuit`.
  pub fn validate(&self) -> Result<()> {
    if self.gates.is_empty() {
      return Err(Error::MalformedCircuit("circuit has no gates".into()));
    }

    // producer index of every internal wire
    let mut producers: HashMap<&str, usize> = HashMap::new();
    for (i, gate) in self.gates.iter().enumerate() {
      if producers.insert(gate.output.as_str(), i).is_some() {
        return Err(Error::MalformedCircuit(format!(
          "wire {} is assigned by more than one gate",
          gate.output,
        )));
      }
    }

    for (i, gate) in self.gates.iter().enumerate() {
      if gate.inputs.len() != gate.op.arity() {
        return Err(Error::MalformedCircuit(format!(
          "gate {} ({}) expects {} inputs, got {}",
          i,
          gate.op,
          gate.op.arity(),
          gate.inputs.len(),
        )));
      }
      for input in &gate.inputs {
        match producers.get(input.as_str()) {
          // produced by a gate that has not run yet
          Some(&j) if j >= i => {
            return Err(Error::MalformedCircuit(format!(
              "gate {} reads wire {} before gate {} produces it",
              i, input, j,
            )));
          }
          // earlier gate output or external input
          _ => {}
        }
      }
    }
    Ok(())
  }

  /// External input wires (consumed but produced by no gate), in first
  /// reference order, deduplicated.
  pub fn external_inputs(&self) -> Vec<String> {
    let produced: HashSet<&str> = self.gates.iter().map(|g| g.output.as_str()).collect();
    let mut seen = HashSet::new();
    let mut inputs = vec![];
    for gate in &self.gates {
      for input in &gate.inputs {
        if !produced.contains(input.as_str()) && seen.insert(input.as_str()) {
          inputs.push(input.clone());
        }
      }
    }
    inputs
  }

  /// Designated output wires: produced by a gate, consumed by none.
  pub fn output_wires(&self) -> Vec<String> {
    let consumed: HashSet<&str> = self
      .gates
      .iter()
      .flat_map(|g| g.inputs.iter().map(|s| s.as_str()))
      .collect();
    self
      .gates
      .iter()
      .filter(|g| !consumed.contains(g.output.as_str()))
      .map(|g| g.output.clone())
      .collect()
  }
}
