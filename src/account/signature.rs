//! Module containing signature data model.

use super::PublicKey;
use anyhow::{Context as _, Result};
use ethnum::{AsU256 as _, U256};
use k256::ecdsa::{self, RecoveryId, VerifyingKey};
use std::fmt::{self, Display, Formatter};

/// A recoverable secp256k1 signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature {
    inner: ecdsa::Signature,
    recovery_id: RecoveryId,
}

impl Signature {
    /// Creates a signature from an ECDSA signature and its recovery ID.
    pub fn new(inner: ecdsa::Signature, recovery_id: RecoveryId) -> Self {
        Self { inner, recovery_id }
    }

    /// Creates a signature from its raw parts.
    pub fn from_parts(recovery_id: u8, r: [u8; 32], s: [u8; 32]) -> Result<Self> {
        Ok(Self {
            inner: ecdsa::Signature::from_scalars(r, s)
                .ok()
                .context("signature scalars are out of range")?,
            recovery_id: RecoveryId::from_byte(recovery_id)
                .with_context(|| format!("invalid recovery ID {recovery_id}"))?,
        })
    }

    /// Returns the recovery ID, 0 or 1 in practice.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id.to_byte()
    }

    /// Returns the y-parity in its 256-bit integer representation.
    ///
    /// Return 0 for even parity, and 1 for odd parity.
    pub fn y_parity(&self) -> U256 {
        self.recovery_id().as_u256()
    }

    /// Returns the signature's V value with EIP-155 chain replay protection.
    pub fn v(&self, chain_id: u64) -> U256 {
        self.y_parity() + chain_id.as_u256() * 2 + 35
    }

    /// Returns the signature's 32-byte R-value in big-endian representation.
    pub fn r(&self) -> [u8; 32] {
        self.inner.r().to_bytes().into()
    }

    /// Returns the signature's 32-byte S-value in big-endian representation.
    pub fn s(&self) -> [u8; 32] {
        self.inner.s().to_bytes().into()
    }

    /// Returns the 64-byte `r || s` encoding, without the recovery ID.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0; 64];
        bytes[..32].copy_from_slice(&self.r());
        bytes[32..].copy_from_slice(&self.s());
        bytes
    }

    /// Recovers the public key that produced this signature for a digest.
    pub fn recover(&self, digest: [u8; 32]) -> Result<PublicKey> {
        let key = VerifyingKey::recover_from_prehash(&digest, &self.inner, self.recovery_id)
            .ok()
            .context("failed to recover public key from signature")?;
        Ok(PublicKey(key))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{account::PrivateKey, hash, testing};

    #[test]
    fn replay_protection() {
        let signature = Signature::from_parts(0, [1; 32], [2; 32]).unwrap();
        assert_eq!(signature.v(1), U256::new(37));
        assert_eq!(signature.v(11155111), U256::new(22310257));

        let signature = Signature::from_parts(1, [1; 32], [2; 32]).unwrap();
        assert_eq!(signature.v(1), U256::new(38));
    }

    #[test]
    fn signature_to_string() {
        let signature = Signature::from_parts(0, [1; 32], [2; 32]).unwrap();
        assert_eq!(
            signature.to_string(),
            "0101010101010101010101010101010101010101010101010101010101010101\
             0202020202020202020202020202020202020202020202020202020202020202",
        );
    }

    #[test]
    fn fixed_width_scalars() {
        let mut r = [0; 32];
        r[31] = 1;
        let signature = Signature::from_parts(0, r, [2; 32]).unwrap();
        assert_eq!(signature.r(), r);
        assert_eq!(signature.to_string().len(), 128);
    }

    #[test]
    fn invalid_parts() {
        assert!(Signature::from_parts(0, [0; 32], [2; 32]).is_err());
        assert!(Signature::from_parts(4, [1; 32], [2; 32]).is_err());
    }

    #[test]
    fn recovers_signer() {
        let key = PrivateKey::new(testing::PRIVATE_KEY).unwrap();
        let digest = hash::message("Hello, world!");
        let signature = key.sign(digest).unwrap();
        assert_eq!(*signature.recover(digest).unwrap().address(), testing::ADDRESS);
    }
}
