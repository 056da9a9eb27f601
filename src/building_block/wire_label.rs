use crate::building_block::util;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_LABEL_BITS: usize = 256;

/// A wire label: a fixed-length random bit string whose least
/// significant bit doubles as the point-and-permute selector bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLabel(Vec<u8>);

impl WireLabel {
  pub fn from_bytes(bytes: Vec<u8>) -> Self {
    WireLabel(bytes)
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  pub fn byte_len(&self) -> usize {
    self.0.len()
  }

  /// Selector bit: least significant bit of the last byte.
  pub fn select_bit(&self) -> bool {
    match self.0.last() {
      Some(b) => b & 1 == 1,
      None => false,
    }
  }
}

/// The two labels of one wire. Invariant: their selector bits differ, so
/// a presented label always identifies exactly one garbled row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireLabelPair {
  label0: WireLabel,
  label1: WireLabel,
}

impl WireLabelPair {
  /// Draws two independent random labels of `bit_len` bits (a positive
  /// multiple of 8). If the selector bits coincide, the low bit of the
  /// second label is flipped; conditioned on the bits differing the
  /// result stays uniform.
  pub fn generate(bit_len: usize) -> Result<Self> {
    assert!(bit_len >= 8 && bit_len % 8 == 0, "label length must be a positive multiple of 8 bits");
    let label0 = util::random_bytes(bit_len / 8)?;
    let mut label1 = util::random_bytes(bit_len / 8)?;

    let lsb0 = label0[label0.len() - 1] & 1;
    let lsb1 = label1[label1.len() - 1] & 1;
    if lsb0 == lsb1 {
      let last = label1.len() - 1;
      label1[last] ^= 1;
    }

    Ok(WireLabelPair {
      label0: WireLabel(label0),
      label1: WireLabel(label1),
    })
  }

  /// The label encoding plaintext bit `bit`.
  pub fn select(&self, bit: bool) -> &WireLabel {
    if bit {
      &self.label1
    } else {
      &self.label0
    }
  }

  /// Output-resolver primitive: maps a resolved label back to its bit.
  /// `None` when the label matches neither entry.
  pub fn decode(&self, label: &WireLabel) -> Option<bool> {
    if label == &self.label0 {
      Some(false)
    } else if label == &self.label1 {
      Some(true)
    } else {
      None
    }
  }

  pub fn byte_len(&self) -> usize {
    self.label0.byte_len()
  }
}

/// Wire name -> label pair. Built by the garbler, private to it for the
/// circuit's lifetime; never transmitted wholesale.
pub type LabelMap = HashMap<String, WireLabelPair>;
