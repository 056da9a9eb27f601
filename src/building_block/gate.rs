use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed catalog of boolean operators. Each variant carries a fixed
/// truth table; the set is exhaustive so dispatch is checked at compile
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOp {
  And,
  Or,
  Xor,
  Not,
  OrNot,
  AndNot,
  Nand,
  Nor,
  Xnor,
  Const0,
  Const1,
}

// binary tables are indexed [a][b]
const AND: [[bool; 2]; 2] = [[false, false], [false, true]];
const OR: [[bool; 2]; 2] = [[false, true], [true, true]];
const XOR: [[bool; 2]; 2] = [[false, true], [true, false]];
const OR_NOT: [[bool; 2]; 2] = [[true, false], [true, true]];
const AND_NOT: [[bool; 2]; 2] = [[false, false], [true, false]];
const NAND: [[bool; 2]; 2] = [[true, true], [true, false]];
const NOR: [[bool; 2]; 2] = [[true, false], [false, false]];
const XNOR: [[bool; 2]; 2] = [[true, false], [false, true]];

const NOT: [bool; 2] = [true, false];
const CONST_0: [bool; 2] = [false, false];
const CONST_1: [bool; 2] = [true, true];

impl GateOp {
  pub fn arity(&self) -> usize {
    match self {
      GateOp::Not | GateOp::Const0 | GateOp::Const1 => 1,
      _ => 2,
    }
  }

  fn binary_table(&self) -> [[bool; 2]; 2] {
    match self {
      GateOp::And => AND,
      GateOp::Or => OR,
      GateOp::Xor => XOR,
      GateOp::OrNot => OR_NOT,
      GateOp::AndNot => AND_NOT,
      GateOp::Nand => NAND,
      GateOp::Nor => NOR,
      GateOp::Xnor => XNOR,
      _ => unreachable!("unary operator has no binary table"),
    }
  }

  fn unary_table(&self) -> [bool; 2] {
    match self {
      GateOp::Not => NOT,
      GateOp::Const0 => CONST_0,
      GateOp::Const1 => CONST_1,
      _ => unreachable!("binary operator has no unary table"),
    }
  }

  /// Evaluates the operator's truth table for one input combination.
  /// `inputs` must match the operator's arity.
  pub fn eval(&self, inputs: &[bool]) -> bool {
    debug_assert_eq!(inputs.len(), self.arity());
    match self.arity() {
      1 => self.unary_table()[inputs[0] as usize],
      _ => self.binary_table()[inputs[0] as usize][inputs[1] as usize],
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      GateOp::And => "and",
      GateOp::Or => "or",
      GateOp::Xor => "xor",
      GateOp::Not => "not",
      GateOp::OrNot => "ornot",
      GateOp::AndNot => "andnot",
      GateOp::Nand => "nand",
      GateOp::Nor => "nor",
      GateOp::Xnor => "xnor",
      GateOp::Const0 => "const_0",
      GateOp::Const1 => "const_1",
    }
  }
}

impl fmt::Display for GateOp {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for GateOp {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "and" => Ok(GateOp::And),
      "or" => Ok(GateOp::Or),
      "xor" => Ok(GateOp::Xor),
      "not" => Ok(GateOp::Not),
      "ornot" => Ok(GateOp::OrNot),
      "andnot" => Ok(GateOp::AndNot),
      "nand" => Ok(GateOp::Nand),
      "nor" => Ok(GateOp::Nor),
      "xnor" => Ok(GateOp::Xnor),
      "const_0" => Ok(GateOp::Const0),
      "const_1" => Ok(GateOp::Const1),
      _ => Err(Error::MalformedCircuit(format!("unsupported operator: {}", s))),
    }
  }
}

/// One gate of the circuit descriptor: operator, ordered input wire
/// names, output wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
  pub op: GateOp,
  pub inputs: Vec<String>,
  pub output: String,
}

impl Gate {
  pub fn new(op: GateOp, inputs: &[&str], output: &str) -> Self {
    Gate {
      op,
      inputs: inputs.iter().map(|s| s.to_string()).collect(),
      output: output.to_string(),
    }
  }

  /// Builds a gate from the operator name used by the external netlist
  /// parser. Unknown names are rejected.
  pub fn parse(op: &str, inputs: &[&str], output: &str) -> Result<Self> {
    Ok(Self::new(op.parse()?, inputs, output))
  }
}
