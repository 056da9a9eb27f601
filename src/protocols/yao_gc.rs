//! Two-party Yao protocol: garbler and evaluator run as independent
//! tasks joined by message-passing channels, standing in for the
//! reliable transport of a real deployment. The building blocks stay
//! synchronous; only the party loops live here.

use crate::building_block::circuit::Circuit;
use crate::building_block::evaluate::{evaluate_circuit, resolve_outputs};
use crate::building_block::garble::garble_circuit;
use crate::building_block::garbled_table::GarbledTable;
use crate::building_block::ot::{self, OtPublicSetup, OtReceiver, OtSender};
use crate::building_block::wire_label::WireLabel;
use crate::error::{Error, Result};
use log::debug;
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Everything that crosses the channel between the two parties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
  /// Garbler -> evaluator: the garbled tables plus the garbler's own
  /// input labels (plaintext-by-agreement; the garbler owns the map).
  GarbledCircuit {
    tables: Vec<GarbledTable>,
    garbler_labels: HashMap<String, WireLabel>,
  },
  /// OT step 1, one session per evaluator input wire.
  OtSetup { wire: String, setup: OtPublicSetup },
  /// OT step 2.
  OtBlinded { wire: String, v: Integer },
  /// OT step 3.
  OtResponse {
    wire: String,
    m0k: Integer,
    m1k: Integer,
    label_len: usize,
  },
  /// Evaluator -> garbler: resolved labels of the designated outputs.
  OutputLabels(HashMap<String, WireLabel>),
  /// Garbler -> evaluator: decoded output bits, shared by agreement.
  Outputs(HashMap<String, bool>),
}

async fn send(tx: &mpsc::Sender<Message>, msg: Message) -> Result<()> {
  tx.send(msg).await.map_err(|_| Error::ChannelClosed)
}

async fn recv(rx: &mut mpsc::Receiver<Message>) -> Result<Message> {
  rx.recv().await.ok_or(Error::ChannelClosed)
}

/// Garbler party: garbles, hands over the tables and its own input
/// labels, serves one OT session per evaluator input wire, then decodes
/// the output labels the evaluator sends back.
pub async fn run_garbler(
  circuit: Circuit,
  inputs: HashMap<String, bool>,
  label_bits: usize,
  modulus_bits: usize,
  tx: mpsc::Sender<Message>,
  mut rx: mpsc::Receiver<Message>,
) -> Result<()> {
  let garbling = garble_circuit(&circuit, label_bits)?;

  let mut garbler_labels = HashMap::new();
  for (name, bit) in &inputs {
    let pair = garbling
      .labels
      .get(name)
      .ok_or_else(|| Error::MalformedCircuit(format!("unknown input wire {}", name)))?;
    garbler_labels.insert(name.clone(), pair.select(*bit).clone());
  }
  send(
    &tx,
    Message::GarbledCircuit {
      tables: garbling.tables.clone(),
      garbler_labels,
    },
  )
  .await?;

  let evaluator_wires: Vec<String> = circuit
    .external_inputs()
    .into_iter()
    .filter(|wire| !inputs.contains_key(wire))
    .collect();

  for wire in evaluator_wires {
    debug!("ot -> sender session for wire:{}", wire);
    let pair = &garbling.labels[&wire];
    let m0 = ot::label_to_integer(pair.select(false));
    let m1 = ot::label_to_integer(pair.select(true));
    let sender = OtSender::new(m0, m1, modulus_bits)?;

    send(
      &tx,
      Message::OtSetup {
        wire: wire.clone(),
        setup: sender.setup(),
      },
    )
    .await?;

    let v = match recv(&mut rx).await? {
      Message::OtBlinded { wire: w, v } if w == wire => v,
      _ => return Err(Error::UnexpectedMessage),
    };
    let (m0k, m1k) = sender.respond(&v);
    send(
      &tx,
      Message::OtResponse {
        wire,
        m0k,
        m1k,
        label_len: pair.byte_len(),
      },
    )
    .await?;
  }

  let output_labels = match recv(&mut rx).await? {
    Message::OutputLabels(labels) => labels,
    _ => return Err(Error::UnexpectedMessage),
  };
  let outputs = resolve_outputs(&garbling.labels, &output_labels, &circuit.output_wires())?;
  send(&tx, Message::Outputs(outputs)).await
}

/// Evaluator party: receives the garbled circuit, obtains one label per
/// own input bit via OT, evaluates, and trades the resolved output
/// labels for the decoded bits.
pub async fn run_evaluator(
  circuit: Circuit,
  inputs: HashMap<String, bool>,
  tx: mpsc::Sender<Message>,
  mut rx: mpsc::Receiver<Message>,
) -> Result<HashMap<String, bool>> {
  let (tables, mut wire_labels) = match recv(&mut rx).await? {
    Message::GarbledCircuit { tables, garbler_labels } => (tables, garbler_labels),
    _ => return Err(Error::UnexpectedMessage),
  };

  let mut sessions: HashMap<String, OtReceiver> = HashMap::new();
  let mut pending = inputs.len();
  while pending > 0 {
    match recv(&mut rx).await? {
      Message::OtSetup { wire, setup } => {
        let bit = *inputs.get(&wire).ok_or(Error::UnexpectedMessage)?;
        let (receiver, v) = OtReceiver::choose(bit, &setup)?;
        sessions.insert(wire.clone(), receiver);
        send(&tx, Message::OtBlinded { wire, v }).await?;
      }
      Message::OtResponse { wire, m0k, m1k, label_len } => {
        debug!("ot -> receiver recovered label for wire:{}", wire);
        let receiver = sessions.remove(&wire).ok_or(Error::UnexpectedMessage)?;
        let m = receiver.recover(&m0k, &m1k);
        wire_labels.insert(wire, ot::integer_to_label(&m, label_len));
        pending -= 1;
      }
      _ => return Err(Error::UnexpectedMessage),
    }
  }

  let resolved = evaluate_circuit(&circuit, &tables, &wire_labels)?;

  let mut output_labels = HashMap::new();
  for name in circuit.output_wires() {
    let label = resolved
      .get(&name)
      .ok_or_else(|| Error::MissingInputLabel(name.clone()))?
      .clone();
    output_labels.insert(name, label);
  }
  send(&tx, Message::OutputLabels(output_labels)).await?;

  match recv(&mut rx).await? {
    Message::Outputs(outputs) => Ok(outputs),
    _ => Err(Error::UnexpectedMessage),
  }
}

/// Wires the two parties together over in-process channels and returns
/// the decoded output bits. Input maps must cover all external wires
/// between them, disjointly.
pub async fn run(
  circuit: &Circuit,
  garbler_inputs: HashMap<String, bool>,
  evaluator_inputs: HashMap<String, bool>,
  label_bits: usize,
  modulus_bits: usize,
) -> Result<HashMap<String, bool>> {
  for wire in circuit.external_inputs() {
    let g = garbler_inputs.contains_key(&wire);
    let e = evaluator_inputs.contains_key(&wire);
    if g == e {
      return Err(Error::MalformedCircuit(format!(
        "external wire {} must be held by exactly one party",
        wire,
      )));
    }
  }

  let (to_evaluator, evaluator_rx) = mpsc::channel(16);
  let (to_garbler, garbler_rx) = mpsc::channel(16);

  let garbler = run_garbler(
    circuit.clone(),
    garbler_inputs,
    label_bits,
    modulus_bits,
    to_evaluator,
    garbler_rx,
  );
  let evaluator = run_evaluator(circuit.clone(), evaluator_inputs, to_garbler, evaluator_rx);

  let (garbler_res, evaluator_res) = tokio::join!(garbler, evaluator);
  garbler_res?;
  evaluator_res
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::building_block::gate::{Gate, GateOp};
  use crate::building_block::wire_label::DEFAULT_LABEL_BITS;

  const TEST_MODULUS_BITS: usize = 512;

  fn bits(entries: &[(&str, bool)]) -> HashMap<String, bool> {
    entries
      .iter()
      .map(|(name, bit)| (name.to_string(), *bit))
      .collect()
  }

  #[tokio::test]
  async fn two_party_and() {
    let _ = env_logger::builder().is_test(true).try_init();
    let circuit = Circuit::new(vec![Gate::new(GateOp::And, &["a", "b"], "out")]);
    for (a, b, expected) in [(true, true, true), (true, false, false), (false, false, false)] {
      let outputs = run(
        &circuit,
        bits(&[("a", a)]),
        bits(&[("b", b)]),
        DEFAULT_LABEL_BITS,
        TEST_MODULUS_BITS,
      )
      .await
      .unwrap();
      assert_eq!(outputs["out"], expected, "a={} b={}", a, b);
    }
  }

  #[tokio::test]
  async fn two_party_and_chain() {
    let circuit = Circuit::new(vec![
      Gate::new(GateOp::And, &["a", "b"], "d"),
      Gate::new(GateOp::And, &["d", "c"], "e"),
    ]);
    for (c, expected) in [(true, true), (false, false)] {
      let outputs = run(
        &circuit,
        bits(&[("a", true), ("b", true)]),
        bits(&[("c", c)]),
        DEFAULT_LABEL_BITS,
        TEST_MODULUS_BITS,
      )
      .await
      .unwrap();
      assert_eq!(outputs["e"], expected, "c={}", c);
    }
  }

  #[tokio::test]
  async fn rejects_overlapping_input_claims() {
    let circuit = Circuit::new(vec![Gate::new(GateOp::And, &["a", "b"], "out")]);
    let res = run(
      &circuit,
      bits(&[("a", true), ("b", true)]),
      bits(&[("b", false)]),
      DEFAULT_LABEL_BITS,
      TEST_MODULUS_BITS,
    )
    .await;
    assert!(matches!(res, Err(Error::MalformedCircuit(_))));
  }

  /// Ripple-carry adder over AND/XOR/OR: s_i = a_i ^ b_i ^ c_i,
  /// c_{i+1} = (a_i & b_i) | (c_i & (a_i ^ b_i)).
  fn ripple_adder(bits_wide: usize) -> Circuit {
    let mut gates = vec![
      Gate::new(GateOp::Xor, &["a0", "b0"], "s0"),
      Gate::new(GateOp::And, &["a0", "b0"], "c1"),
    ];
    for i in 1..bits_wide {
      let (a, b, c) = (format!("a{}", i), format!("b{}", i), format!("c{}", i));
      let (x, t, u) = (format!("x{}", i), format!("t{}", i), format!("u{}", i));
      gates.push(Gate::new(GateOp::Xor, &[&a, &b], &x));
      gates.push(Gate::new(GateOp::Xor, &[&x, &c], &format!("s{}", i)));
      gates.push(Gate::new(GateOp::And, &[&a, &b], &t));
      gates.push(Gate::new(GateOp::And, &[&x, &c], &u));
      gates.push(Gate::new(GateOp::Or, &[&t, &u], &format!("c{}", i + 1)));
    }
    Circuit::new(gates)
  }

  #[tokio::test]
  async fn ripple_adder_matches_binary_addition() {
    const WIDTH: usize = 4;
    // short labels and a small session modulus keep 256 full runs
    // (four OT sessions each) affordable
    const ADDER_LABEL_BITS: usize = 64;
    const ADDER_MODULUS_BITS: usize = 256;
    let circuit = ripple_adder(WIDTH);

    for a in 0..16u32 {
      for b in 0..16u32 {
        let garbler_inputs: HashMap<String, bool> = (0..WIDTH)
          .map(|i| (format!("a{}", i), a >> i & 1 == 1))
          .collect();
        let evaluator_inputs: HashMap<String, bool> = (0..WIDTH)
          .map(|i| (format!("b{}", i), b >> i & 1 == 1))
          .collect();

        let outputs = run(
          &circuit,
          garbler_inputs,
          evaluator_inputs,
          ADDER_LABEL_BITS,
          ADDER_MODULUS_BITS,
        )
        .await
        .unwrap();

        let mut sum = 0u32;
        for i in 0..WIDTH {
          if outputs[&format!("s{}", i)] {
            sum |= 1 << i;
          }
        }
        if outputs[&format!("c{}", WIDTH)] {
          sum |= 1 << WIDTH;
        }
        assert_eq!(sum, a + b, "a={} b={}", a, b);
      }
    }
  }
}
