//! Module implementing public key operations.

use crate::hash;
use anyhow::{ensure, Context as _, Result};
use ethaddr::Address;
use k256::{
    ecdsa::{self, signature::hazmat::PrehashVerifier as _, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint as _,
};

/// A public key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey(pub VerifyingKey);

impl PublicKey {
    /// Parses a SEC1 encoded public key, either compressed (33 bytes) or
    /// uncompressed (65 bytes).
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key = VerifyingKey::from_sec1_bytes(bytes)
            .ok()
            .with_context(|| format!("invalid secp256k1 public key of {} bytes", bytes.len()))?;
        Ok(Self(key))
    }

    /// Parses a hexadecimal SEC1 encoded public key, with or without a `0x`
    /// prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = crate::canonical::hex(s).context("invalid public key")?;
        Self::from_slice(&bytes)
    }

    /// Returns an uncompressed encoded bytes for the public key.
    pub fn encode_uncompressed(&self) -> [u8; 65] {
        let point = k256::PublicKey::from(&self.0).to_encoded_point(false);
        let mut encoded = [0; 65];
        encoded.copy_from_slice(point.as_bytes());
        encoded
    }

    /// Returns the public address for the public key.
    pub fn address(&self) -> Address {
        // NOTE: An ethereum address is the last 20 bytes of the keccak hash of
        // the public key without the leading 0x04 uncompressed point tag.
        let public_key = self.encode_uncompressed();
        debug_assert_eq!(public_key[0], 0x04);
        let hash = hash::keccak256(&public_key[1..]);
        Address::from_slice(&hash[12..])
    }

    /// Verifies a 64-byte `r || s` signature over a 32-byte digest.
    ///
    /// A well-formed signature that does not match returns `false`; only
    /// malformed signatures (wrong length, out of range scalars) are errors.
    pub fn verify(&self, digest: [u8; 32], signature: &[u8]) -> Result<bool> {
        ensure!(
            signature.len() == 64,
            "signature must be 64 bytes but got {}",
            signature.len(),
        );
        let signature = ecdsa::Signature::from_slice(signature)
            .ok()
            .context("signature scalars are out of range")?;
        Ok(self.0.verify_prehash(&digest, &signature).is_ok())
    }
}
