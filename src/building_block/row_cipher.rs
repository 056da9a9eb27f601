use crate::building_block::util;
use crate::error::{Error, Result};
use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce, Tag};
use serde::{Deserialize, Serialize};

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// One encrypted truth-table row: AES-256-GCM ciphertext with its fresh
/// nonce and detached 128-bit authentication tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
  pub nonce: [u8; NONCE_LEN],
  pub tag: [u8; TAG_LEN],
  pub ciphertext: Vec<u8>,
}

/// Encrypts one output label under a row key. The key is a hash of a
/// unique label combination, so it is never reused across rows.
pub fn encrypt_row(key: &[u8; 32], plaintext: &[u8]) -> Result<EncryptedPayload> {
  let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

  let nonce_bytes = util::random_bytes(NONCE_LEN)?;
  let mut nonce = [0u8; NONCE_LEN];
  nonce.copy_from_slice(&nonce_bytes);

  let mut ciphertext = plaintext.to_vec();
  let tag = cipher
    .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut ciphertext)
    .map_err(|_| Error::AuthenticationFailure)?;

  let mut tag_bytes = [0u8; TAG_LEN];
  tag_bytes.copy_from_slice(&tag);

  Ok(EncryptedPayload {
    nonce,
    tag: tag_bytes,
    ciphertext,
  })
}

/// Decrypts one row; any tag mismatch is `AuthenticationFailure`.
pub fn decrypt_row(key: &[u8; 32], payload: &EncryptedPayload) -> Result<Vec<u8>> {
  let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

  let mut plaintext = payload.ciphertext.clone();
  cipher
    .decrypt_in_place_detached(
      Nonce::from_slice(&payload.nonce),
      b"",
      &mut plaintext,
      Tag::from_slice(&payload.tag),
    )
    .map_err(|_| Error::AuthenticationFailure)?;

  Ok(plaintext)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
      *b = i as u8;
    }
    key
  }

  #[test]
  fn round_trip() {
    let key = test_key();
    let label = util::random_bytes(32).unwrap();

    let payload = encrypt_row(&key, &label).unwrap();
    assert_eq!(decrypt_row(&key, &payload).unwrap(), label);
  }

  #[test]
  fn fresh_nonce_per_row() {
    let key = test_key();
    let a = encrypt_row(&key, b"label").unwrap();
    let b = encrypt_row(&key, b"label").unwrap();
    assert_ne!(a.nonce, b.nonce);
  }

  #[test]
  fn tampering_fails_authentication() {
    let key = test_key();
    let payload = encrypt_row(&key, &util::random_bytes(32).unwrap()).unwrap();

    for i in 0..payload.ciphertext.len() {
      let mut tampered = payload.clone();
      tampered.ciphertext[i] ^= 0x01;
      assert_eq!(decrypt_row(&key, &tampered), Err(Error::AuthenticationFailure));
    }
    for i in 0..NONCE_LEN {
      let mut tampered = payload.clone();
      tampered.nonce[i] ^= 0x01;
      assert_eq!(decrypt_row(&key, &tampered), Err(Error::AuthenticationFailure));
    }
    for i in 0..TAG_LEN {
      let mut tampered = payload.clone();
      tampered.tag[i] ^= 0x01;
      assert_eq!(decrypt_row(&key, &tampered), Err(Error::AuthenticationFailure));
    }
  }

  #[test]
  fn wrong_key_fails_authentication() {
    let payload = encrypt_row(&test_key(), b"label").unwrap();
    let mut other = test_key();
    other[0] ^= 0xff;
    assert_eq!(decrypt_row(&other, &payload), Err(Error::AuthenticationFailure));
  }
}
