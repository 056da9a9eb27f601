use crate::building_block::circuit::Circuit;
use crate::building_block::combined_key::CombinedKey;
use crate::building_block::garbled_table::GarbledTable;
use crate::building_block::row_cipher;
use crate::building_block::wire_label::{LabelMap, WireLabel};
use crate::error::{Error, Result};
use log::debug;
use std::collections::HashMap;

/// Evaluates a garbled circuit using only labels: per gate, in the same
/// topological order the garbler used, derives the combined key and
/// selector bits from the gathered input labels, finds the unique
/// selector-matching row and decrypts it to the output label.
///
/// `inputs` must hold one label per external wire; returns a label for
/// every wire touched, external inputs included.
pub fn evaluate_circuit(
  circuit: &Circuit,
  tables: &[GarbledTable],
  inputs: &HashMap<String, WireLabel>,
) -> Result<HashMap<String, WireLabel>> {
  circuit.validate()?;
  if tables.len() != circuit.gates.len() {
    return Err(Error::MalformedCircuit(format!(
      "{} gates but {} garbled tables",
      circuit.gates.len(),
      tables.len(),
    )));
  }

  let mut resolved = inputs.clone();

  for (index, (gate, table)) in circuit.gates.iter().zip(tables).enumerate() {
    let mut in_labels = Vec::with_capacity(gate.inputs.len());
    for name in &gate.inputs {
      let label = resolved
        .get(name)
        .ok_or_else(|| Error::MissingInputLabel(name.clone()))?;
      in_labels.push(label);
    }

    let ck = CombinedKey::derive(&in_labels);
    let row = table
      .find_row(ck.selector0, ck.selector1)
      .ok_or(Error::RowNotFound { gate: index })?;
    let out_label = row_cipher::decrypt_row(&ck.key, &row.payload)?;

    debug!(
      "evaluate -> gate:{} out:{} label:{}",
      index,
      gate.output,
      hex::encode(&out_label),
    );
    resolved.insert(gate.output.clone(), WireLabel::from_bytes(out_label));
  }

  Ok(resolved)
}

/// Output resolver: maps resolved output labels back to bits via the
/// garbler-private label map. Only the label-map holder can do this.
pub fn resolve_outputs(
  labels: &LabelMap,
  resolved: &HashMap<String, WireLabel>,
  outputs: &[String],
) -> Result<HashMap<String, bool>> {
  let mut bits = HashMap::new();
  for name in outputs {
    let pair = labels
      .get(name)
      .ok_or_else(|| Error::MalformedCircuit(format!("unknown output wire {}", name)))?;
    let label = resolved
      .get(name)
      .ok_or_else(|| Error::MissingInputLabel(name.clone()))?;
    let bit = pair
      .decode(label)
      .ok_or_else(|| Error::OutputLabelMismatch(name.clone()))?;
    bits.insert(name.clone(), bit);
  }
  Ok(bits)
}
