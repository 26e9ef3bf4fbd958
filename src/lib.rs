//! Public key cryptography workbench for secp256k1 and Ethereum.
//!
//! This crate implements key generation, message signing and verification,
//! a toy public key encryption scheme, and legacy EIP-155 transaction
//! signing, along with the RLP and ABI encodings they rely on. Signed
//! transactions can be broadcast over JSON-RPC, Solidity sources compiled
//! with `solc`, and every operation is exposed over a small HTTP JSON API.

pub mod abi;
pub mod account;
pub mod api;
pub mod canonical;
pub mod cipher;
pub mod hash;
mod rand;
pub mod rlp;
pub mod rpc;
mod serialization;
pub mod server;
pub mod session;
pub mod solc;
pub mod transaction;

#[cfg(test)]
mod testing;
