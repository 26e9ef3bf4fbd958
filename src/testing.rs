//! Deterministic key material for tests.
//!
//! The key is the account at index 0 of the Ganache deterministic mnemonic
//! `"myth like bonus scare over problem client lizard pioneer submit female
//! collect"`, whose address is widely used in Ethereum tooling tests.

use hex_literal::hex;

/// The private key.
pub const PRIVATE_KEY: [u8; 32] =
    hex!("4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d");

/// The uncompressed SEC1 encoded public key.
pub const PUBLIC_KEY: [u8; 65] = hex!(
    "04e68acfc0253a10620dff706b0a1b1f1f5833ea3beb3bde2250d5f271f3563606
       672ebc45e0b7ea2e816ecb70ca03137b1c9476eec63d4632e990020b7b6fba39"
);

/// The public address.
pub const ADDRESS: [u8; 20] = hex!("90F8bf6A479f320ead074411a4B0e7944Ea8c9C1");
