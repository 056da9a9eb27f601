use crate::building_block::wire_label::WireLabel;
use sha3::{Digest, Sha3_256};

/// Row key and selector bits derived from the 1-2 input labels of one
/// truth-table combination.
#[derive(Debug)]
pub struct CombinedKey {
  pub key: [u8; 32],
  pub selector0: bool,
  pub selector1: Option<bool>,
}

impl CombinedKey {
  /// Key = SHA3-256 over the labels concatenated in canonical sorted
  /// byte order, so garbler and evaluator derive the same key whichever
  /// order the labels arrive in. Selector bits stay in presentation
  /// order; only the hash input is sorted.
  pub fn derive(labels: &[&WireLabel]) -> Self {
    debug_assert!(labels.len() == 1 || labels.len() == 2);

    let selector0 = labels[0].select_bit();
    let selector1 = labels.get(1).map(|l| l.select_bit());

    let mut sorted: Vec<&[u8]> = labels.iter().map(|l| l.as_bytes()).collect();
    sorted.sort();

    let mut hasher = Sha3_256::new();
    for bytes in sorted {
      hasher.update(bytes);
    }
    let key: [u8; 32] = hasher.finalize().into();

    CombinedKey { key, selector0, selector1 }
  }
}
