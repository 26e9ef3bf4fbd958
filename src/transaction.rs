//! Module defining Ethereum transactions, the validation of signing requests
//! and the EIP-155 signing pipeline.

mod legacy;
mod request;

pub use self::{
    legacy::LegacyTransaction,
    request::{Mode, Request},
};
use crate::{
    account::{PrivateKey, Signature},
    hash,
};
use anyhow::Result;
use ethnum::U256;

/// The chain ID used when a request does not specify one (Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// A signed transaction, ready to be broadcast.
#[derive(Clone, Debug)]
pub struct SignedTransaction {
    /// The transaction that was signed.
    pub transaction: LegacyTransaction,
    /// The signature over the transaction's EIP-155 signing message.
    pub signature: Signature,
    /// The RLP encoded signed transaction.
    pub encoded: Vec<u8>,
    /// The transaction hash, i.e. the Keccak-256 digest of `encoded`.
    pub hash: [u8; 32],
}

impl SignedTransaction {
    /// Returns the signature's EIP-155 V value.
    pub fn v(&self) -> U256 {
        self.signature.v(self.transaction.chain_id)
    }
}

impl LegacyTransaction {
    /// Returns the 32-byte message used for signing.
    pub fn signing_message(&self) -> [u8; 32] {
        hash::keccak256(self.rlp_encode(None))
    }

    /// Returns the RLP encoded transaction with the specified signature.
    pub fn encode(&self, signature: &Signature) -> Vec<u8> {
        self.rlp_encode(Some(signature))
    }

    /// Signs the transaction with a private key.
    pub fn sign(self, key: &PrivateKey) -> Result<SignedTransaction> {
        let signature = key.sign(self.signing_message())?;
        let encoded = self.encode(&signature);
        let hash = hash::keccak256(&encoded);
        Ok(SignedTransaction {
            transaction: self,
            signature,
            encoded,
            hash,
        })
    }
}
