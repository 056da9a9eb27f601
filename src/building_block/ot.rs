use crate::building_block::util;
use crate::building_block::wire_label::{WireLabel, WireLabelPair};
use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};
use rug::integer::Order;
use rug::Integer;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// Sender's first message: the one-time public key and the two random
/// blinding values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtPublicSetup {
  pub e: Integer,
  pub n: Integer,
  pub x0: Integer,
  pub x1: Integer,
}

/// Sender side of one 1-out-of-2 transfer. Holds the two secret
/// messages and an RSA keypair generated for this session alone;
/// nothing here may be reused across transfers.
pub struct OtSender {
  d: Integer,
  e: Integer,
  n: Integer,
  x0: Integer,
  x1: Integer,
  m0: Integer,
  m1: Integer,
}

fn biguint_to_integer(value: &BigUint) -> Integer {
  Integer::from_digits(&value.to_bytes_be(), Order::MsfBe)
}

fn modp(value: Integer, n: &Integer) -> Integer {
  let mut r = value % n;
  if r < 0 {
    r += n;
  }
  r
}

fn random_below(n: &Integer) -> Result<Integer> {
  let bytes = util::random_bytes(n.significant_digits::<u8>())?;
  Ok(Integer::from_digits(&bytes, Order::MsfBe) % n)
}

impl OtSender {
  /// Draws a fresh RSA keypair and two blinding values. Message values
  /// must be strictly below the modulus; anything else is rejected here,
  /// before any encoding could silently wrap it.
  pub fn new(m0: Integer, m1: Integer, modulus_bits: usize) -> Result<Self> {
    let sk =
      RsaPrivateKey::new(&mut OsRng, modulus_bits).map_err(|_| Error::RandomnessUnavailable)?;
    let n = biguint_to_integer(sk.n());
    let e = biguint_to_integer(sk.e());
    let d = biguint_to_integer(sk.d());

    if m0 < 0 || m1 < 0 || m0 >= n || m1 >= n {
      return Err(Error::OtRangeError);
    }

    let x0 = random_below(&n)?;
    let x1 = random_below(&n)?;

    Ok(OtSender { d, e, n, x0, x1, m0, m1 })
  }

  /// Step 1: (e, N, x0, x1) for the receiver.
  pub fn setup(&self) -> OtPublicSetup {
    OtPublicSetup {
      e: self.e.clone(),
      n: self.n.clone(),
      x0: self.x0.clone(),
      x1: self.x1.clone(),
    }
  }

  /// Step 3: unblinds `v` against both blinding values. Exactly one of
  /// k0/k1 equals the receiver's nonce; the trapdoor hides which, so
  /// both messages are offset and returned. `secure_pow_mod` keeps the
  /// d-exponentiations constant-structure.
  pub fn respond(&self, v: &Integer) -> (Integer, Integer) {
    let k0 = modp(Integer::from(v - &self.x0), &self.n).secure_pow_mod(&self.d, &self.n);
    let k1 = modp(Integer::from(v - &self.x1), &self.n).secure_pow_mod(&self.d, &self.n);

    let m0k = modp(Integer::from(&self.m0 + &k0), &self.n);
    let m1k = modp(Integer::from(&self.m1 + &k1), &self.n);
    (m0k, m1k)
  }
}

/// Receiver side of one transfer: knows its selector bit and the nonce
/// that blinds it.
pub struct OtReceiver {
  bit: bool,
  k: Integer,
  n: Integer,
}

impl OtReceiver {
  /// Step 2: draws the nonce k and blinds the chosen x with it.
  pub fn choose(bit: bool, setup: &OtPublicSetup) -> Result<(Self, Integer)> {
    let k = random_below(&setup.n)?;
    let ke = k.clone().secure_pow_mod(&setup.e, &setup.n);

    let xb = if bit { &setup.x1 } else { &setup.x0 };
    let v = modp(Integer::from(xb + &ke), &setup.n);

    let receiver = OtReceiver {
      bit,
      k,
      n: setup.n.clone(),
    };
    Ok((receiver, v))
  }

  /// Step 4: subtracts the nonce from the chosen offset message. The
  /// other message stays masked by a value the receiver cannot compute.
  pub fn recover(&self, m0k: &Integer, m1k: &Integer) -> Integer {
    let mbk = if self.bit { m1k } else { m0k };
    modp(Integer::from(mbk - &self.k), &self.n)
  }
}

/// Fixed-width big-endian encoding so leading zero bytes survive the
/// round trip through the modular arithmetic.
pub fn label_to_integer(label: &WireLabel) -> Integer {
  Integer::from_digits(label.as_bytes(), Order::MsfBe)
}

pub fn integer_to_label(value: &Integer, byte_len: usize) -> WireLabel {
  let digits = value.to_digits::<u8>(Order::MsfBe);
  let mut bytes = vec![0u8; byte_len.saturating_sub(digits.len())];
  bytes.extend_from_slice(&digits);
  WireLabel::from_bytes(bytes)
}

/// Runs one complete four-step session for a wire: the receiver learns
/// the label for `bit` and nothing about the other label.
pub fn transfer_label(
  pair: &WireLabelPair,
  bit: bool,
  modulus_bits: usize,
) -> Result<WireLabel> {
  let m0 = label_to_integer(pair.select(false));
  let m1 = label_to_integer(pair.select(true));

  let sender = OtSender::new(m0, m1, modulus_bits)?;
  let setup = sender.setup();
  let (receiver, v) = OtReceiver::choose(bit, &setup)?;
  let (m0k, m1k) = sender.respond(&v);
  let m = receiver.recover(&m0k, &m1k);

  Ok(integer_to_label(&m, pair.byte_len()))
}
