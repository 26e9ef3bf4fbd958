//! Module implementing `secp256k1` key pairs.

mod public;
mod signature;

pub use self::{public::PublicKey, signature::Signature};
use crate::rand;
use anyhow::{ensure, Context as _, Result};
use ethaddr::Address;
use k256::ecdsa::SigningKey;
use std::fmt::{self, Debug, Formatter};

/// A struct representing an Ethereum private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Creates a private key from a secret.
    ///
    /// The secret must be exactly 32 bytes and represent a scalar in the
    /// range `[1, n-1]`, where `n` is the `secp256k1` group order.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        ensure!(
            secret.len() == 32,
            "private key must be 32 bytes but got {}",
            secret.len(),
        );
        let key = SigningKey::from_slice(secret)
            .ok()
            .context("private key is not a valid secp256k1 scalar")?;
        Ok(PrivateKey(key))
    }

    /// Parses a private key from a hexadecimal string, with or without a
    /// `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let secret = crate::canonical::fixed_hex::<32>(s).context("invalid private key")?;
        Self::new(secret)
    }

    /// Generates a new random private key, drawing fresh OS entropy until a
    /// valid scalar is found.
    pub fn random() -> Result<Self> {
        loop {
            let secret = rand::bytes::<32>().context("failed to read OS entropy")?;
            if let Ok(key) = Self::new(secret) {
                return Ok(key);
            }
        }
    }

    /// Returns the 32-byte secret scalar.
    pub fn secret(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    /// Returns the public key for the private key.
    pub fn public(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Returns the public address for the private key.
    pub fn address(&self) -> Address {
        self.public().address()
    }

    /// Generate a deterministic (RFC 6979) signature for the specified
    /// 32-byte digest.
    pub fn sign(&self, digest: [u8; 32]) -> Result<Signature> {
        let (signature, recovery_id) = self
            .0
            .sign_prehash_recoverable(&digest)
            .context("failed to sign digest")?;
        Ok(Signature::new(signature, recovery_id))
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&self.address()).finish()
    }
}

/// A private key together with its derived public key and address.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
    pub address: Address,
}

impl KeyPair {
    /// Generates a new random key pair.
    pub fn generate() -> Result<Self> {
        Ok(Self::from(PrivateKey::random()?))
    }
}

impl From<PrivateKey> for KeyPair {
    fn from(private_key: PrivateKey) -> Self {
        let public_key = private_key.public();
        let address = public_key.address();
        Self {
            private_key,
            public_key,
            address,
        }
    }
}
