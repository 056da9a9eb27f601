use crate::error::{Error, Result};
use rand::{rngs::OsRng, Rng, RngCore};

/// Draws `len` bytes from the OS secure RNG.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
  let mut buf = vec![0u8; len];
  OsRng
    .try_fill_bytes(&mut buf)
    .map_err(|_| Error::RandomnessUnavailable)?;
  Ok(buf)
}

/// Fisher-Yates shuffle with one uniform secure index draw per remaining
/// prefix length.
pub fn secure_shuffle<T>(items: &mut [T]) {
  for i in (1..items.len()).rev() {
    let j = OsRng.gen_range(0..=i);
    items.swap(i, j);
  }
}
