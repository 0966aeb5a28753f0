use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceTokenError {
  #[error("Service token digest is not valid hex: {0}")]
  InvalidHex(#[from] hex::FromHexError),

  #[error("Service token digest must be 32 bytes, got {0}")]
  InvalidLength(usize),
}

/// Checks bearer tokens against the configured SHA-256 digest. The token
/// itself is never stored.
#[derive(Clone)]
pub struct ServiceTokenVerifier {
  digest: [u8; 32],
}

impl ServiceTokenVerifier {
  pub fn from_hex_digest(digest_hex: &str) -> Result<Self, ServiceTokenError> {
    let bytes = hex::decode(digest_hex.trim())?;
    let digest: [u8; 32] = bytes
      .as_slice()
      .try_into()
      .map_err(|_| ServiceTokenError::InvalidLength(bytes.len()))?;
    Ok(Self { digest })
  }

  pub fn verify(&self, token: &str) -> bool {
    let candidate = Sha256::digest(token.as_bytes());

    // Constant time
    candidate
      .iter()
      .zip(self.digest.iter())
      .fold(0u8, |acc, (a, b)| acc | (a ^ b))
      == 0
  }
}

/// Hex SHA-256 digest of a token, as expected in configuration
pub fn digest_hex(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}
