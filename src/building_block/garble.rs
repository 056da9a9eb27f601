use crate::building_block::circuit::Circuit;
use crate::building_block::garbled_table::GarbledTable;
use crate::building_block::wire_label::{LabelMap, WireLabelPair};
use crate::error::Result;
use log::debug;

/// Result of garbling one circuit: the garbler-private label map and the
/// transmissible garbled tables, positionally aligned with the gate
/// order of the circuit descriptor.
#[derive(Debug)]
pub struct Garbling {
  pub labels: LabelMap,
  pub tables: Vec<GarbledTable>,
}

/// Garbles a topologically ordered circuit. Walks the gates in order,
/// resolving each input wire's pair from the running label map and
/// allocating a fresh pair on first reference (which is how external
/// inputs receive their labels). A pair, once assigned to a wire, is
/// reused verbatim by every gate consuming that wire.
pub fn garble_circuit(circuit: &Circuit, label_bits: usize) -> Result<Garbling> {
  circuit.validate()?;

  let mut labels = LabelMap::new();
  let mut tables = Vec::with_capacity(circuit.gates.len());

  for (index, gate) in circuit.gates.iter().enumerate() {
    debug!(
      "garble -> gate:{} type:{} in:{:?} out:{}",
      index, gate.op, gate.inputs, gate.output,
    );

    for name in &gate.inputs {
      if !labels.contains_key(name) {
        labels.insert(name.clone(), WireLabelPair::generate(label_bits)?);
      }
    }
    let output_pair = WireLabelPair::generate(label_bits)?;

    let input_pairs: Vec<&WireLabelPair> =
      gate.inputs.iter().map(|name| &labels[name]).collect();
    let table = GarbledTable::garble(gate.op, &input_pairs, &output_pair)?;

    labels.insert(gate.output.clone(), output_pair);
    tables.push(table);
  }

  Ok(Garbling { labels, tables })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::building_block::gate::{Gate, GateOp};
  use crate::building_block::wire_label::DEFAULT_LABEL_BITS;
  use crate::error::Error;

  #[test]
  fn garbling_covers_every_wire() {
    let circuit = Circuit::new(vec![
      Gate::new(GateOp::And, &["a", "b"], "d"),
      Gate::new(GateOp::Xor, &["d", "c"], "e"),
    ]);
    let garbling = garble_circuit(&circuit, DEFAULT_LABEL_BITS).unwrap();

    assert_eq!(garbling.tables.len(), 2);
    for wire in ["a", "b", "c", "d", "e"] {
      assert!(garbling.labels.contains_key(wire), "missing pair for {}", wire);
    }
  }

  #[test]
  fn fan_out_wires_share_one_pair() {
    // "a" feeds both gates; both tables must be built from the same pair
    let circuit = Circuit::new(vec![
      Gate::new(GateOp::And, &["a", "b"], "c"),
      Gate::new(GateOp::Or, &["a", "c"], "d"),
    ]);
    let garbling = garble_circuit(&circuit, DEFAULT_LABEL_BITS).unwrap();
    assert_eq!(garbling.labels.len(), 4);
  }

  #[test]
  fn malformed_circuit_is_rejected_before_garbling() {
    let circuit = Circuit::new(vec![Gate::new(GateOp::And, &["a", "c"], "c")]);
    assert!(matches!(
      garble_circuit(&circuit, DEFAULT_LABEL_BITS),
      Err(Error::MalformedCircuit(_)),
    ));
  }
}
