//! Yao's garbled-circuit protocol for semi-honest two-party computation
//! over boolean circuits, with an RSA-blinding 1-out-of-2 oblivious
//! transfer for delivering the evaluator's input labels.

pub mod building_block;
pub mod error;
pub mod protocols;
