use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Protocol errors. All of these are fatal for the session in which they
/// occur; a caller may start a fresh session with fresh randomness but
/// must never reuse keys or blinding values from a failed attempt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("secure randomness unavailable")]
  RandomnessUnavailable,

  #[error("malformed circuit: {0}")]
  MalformedCircuit(String),

  #[error("no garbled row matches the derived selector bits at gate {gate}")]
  RowNotFound { gate: usize },

  #[error("garbled row failed authentication")]
  AuthenticationFailure,

  #[error("OT message value is not strictly less than the session modulus")]
  OtRangeError,

  #[error("no label supplied for external wire {0}")]
  MissingInputLabel(String),

  #[error("resolved label for output wire {0} matches neither entry of its pair")]
  OutputLabelMismatch(String),

  #[error("counterpart channel closed mid-protocol")]
  ChannelClosed,

  #[error("unexpected message from counterpart")]
  UnexpectedMessage,
}
