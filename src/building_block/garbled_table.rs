use crate::building_block::combined_key::CombinedKey;
use crate::building_block::gate::GateOp;
use crate::building_block::row_cipher::{self, EncryptedPayload};
use crate::building_block::util;
use crate::building_block::wire_label::{WireLabel, WireLabelPair};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One encrypted row plus the selector bits of the input labels that
/// decrypt it. `selector1` is absent for unary gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarbledRow {
  pub selector0: bool,
  pub selector1: Option<bool>,
  pub payload: EncryptedPayload,
}

/// A gate's encrypted truth table, shuffled so row position carries no
/// information about the input combination it encodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarbledTable {
  pub rows: Vec<GarbledRow>,
}

fn combinations(arity: usize) -> Vec<Vec<bool>> {
  // fixed enumeration order: 00,01,10,11 binary; 0,1 unary
  match arity {
    1 => vec![vec![false], vec![true]],
    _ => vec![
      vec![false, false],
      vec![false, true],
      vec![true, false],
      vec![true, true],
    ],
  }
}

impl GarbledTable {
  /// Garbles one gate: per input combination, evaluates the operator's
  /// truth table, derives the combined row key from that combination's
  /// input labels and encrypts the matching output label. Keys must be
  /// derived from true combination order; only the final storage order
  /// is randomized, by a secure shuffle applied after encryption.
  pub fn garble(
    op: GateOp,
    input_pairs: &[&WireLabelPair],
    output_pair: &WireLabelPair,
  ) -> Result<Self> {
    debug_assert_eq!(input_pairs.len(), op.arity());

    let mut rows = vec![];
    for combo in combinations(op.arity()) {
      let in_labels: Vec<&WireLabel> = combo
        .iter()
        .zip(input_pairs)
        .map(|(bit, pair)| pair.select(*bit))
        .collect();
      let out_label = output_pair.select(op.eval(&combo));

      let ck = CombinedKey::derive(&in_labels);
      let payload = row_cipher::encrypt_row(&ck.key, out_label.as_bytes())?;
      rows.push(GarbledRow {
        selector0: ck.selector0,
        selector1: ck.selector1,
        payload,
      });
    }

    util::secure_shuffle(&mut rows);
    Ok(GarbledTable { rows })
  }

  /// The unique row whose stored selector bits match the presented ones.
  pub fn find_row(&self, selector0: bool, selector1: Option<bool>) -> Option<&GarbledRow> {
    self
      .rows
      .iter()
      .find(|row| row.selector0 == selector0 && row.selector1 == selector1)
  }
}
