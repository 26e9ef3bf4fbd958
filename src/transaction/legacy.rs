//! Legacy Ethereum transaction type definition and RLP encoding.

use crate::{account::Signature, rlp};
use ethaddr::Address;
use ethnum::{AsU256 as _, U256};

/// A Legacy Ethereum transaction with EIP-155 replay protection.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyTransaction {
    /// The nonce for the transaction.
    pub nonce: U256,
    /// The gas price in Wei for the transaction.
    pub gas_price: U256,
    /// The gas limit for the transaction.
    pub gas: U256,
    /// The target address for the transaction. This can also be `None` to
    /// indicate a contract creation transaction.
    pub to: Option<Address>,
    /// The amount of Wei to send with the transaction.
    pub value: U256,
    /// The calldata or contract creation code to use for the transaction.
    pub data: Vec<u8>,
    /// The chain ID the transaction is bound to.
    pub chain_id: u64,
}

impl LegacyTransaction {
    /// Returns the RLP encoded transaction with an optional signature.
    ///
    /// Without a signature, the EIP-155 signing payload is produced where
    /// the trailing `v, r, s` fields are `chain_id, 0, 0`.
    pub fn rlp_encode(&self, signature: Option<&Signature>) -> Vec<u8> {
        let fields = [
            rlp::uint(self.nonce),
            rlp::uint(self.gas_price),
            rlp::uint(self.gas),
            self.to
                .map_or_else(|| rlp::bytes(b""), |to| rlp::bytes(&*to)),
            rlp::uint(self.value),
            rlp::bytes(&self.data),
        ];

        let (v, r, s) = match signature {
            Some(signature) => (
                signature.v(self.chain_id),
                U256::from_be_bytes(signature.r()),
                U256::from_be_bytes(signature.s()),
            ),
            None => (self.chain_id.as_u256(), U256::ZERO, U256::ZERO),
        };
        let tail = [rlp::uint(v), rlp::uint(r), rlp::uint(s)];

        rlp::iter(fields.iter().chain(tail.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethaddr::address;
    use hex_literal::hex;

    #[test]
    fn encode() {
        assert_eq!(
            LegacyTransaction {
                chain_id: 1,
                nonce: 66.as_u256(),
                gas_price: 42e9.as_u256(),
                gas: 30_000.as_u256(),
                to: Some(address!("0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF")),
                value: 13.37e18.as_u256(),
                data: vec![],
            }
            .rlp_encode(None),
            hex!(
                "ec428509c765240082753094deadbeefdeadbeefdeadbeefdeadbeefdeadbeef
                 88b98bc829a6f9000080018080"
            )
            .to_owned(),
        );
        assert_eq!(
            LegacyTransaction {
                chain_id: 1,
                nonce: 777.as_u256(),
                gas_price: 42e9.as_u256(),
                gas: 100_000.as_u256(),
                to: None,
                value: 0.as_u256(),
                data: hex!(
                    "363d3d373d3d3d363d73deadbeefdeadbeefdeadbeefdeadbeefdeadbeef5af43d82803e90
                     3d91602b57fd5bf3"
                )
                .to_vec(),
            }
            .rlp_encode(None),
            hex!(
                "f8408203098509c7652400830186a08080ad363d3d373d3d3d363d73deadbeef
                 deadbeefdeadbeefdeadbeefdeadbeef5af43d82803e903d91602b57fd5bf301
                 8080"
            )
            .to_vec(),
        );
    }

    #[test]
    fn sepolia_signing_payload() {
        let tx = LegacyTransaction {
            chain_id: 11_155_111,
            nonce: U256::ZERO,
            gas_price: 20e9.as_u256(),
            gas: 21_000.as_u256(),
            to: Some(Address::from_slice(&[0; 20])),
            value: 1e18.as_u256(),
            data: vec![],
        };
        assert_eq!(
            tx.rlp_encode(None),
            hex!(
                "ef808504a817c800825208940000000000000000000000000000000000000000
                 880de0b6b3a76400008083aa36a78080"
            ),
        );
    }

    #[test]
    fn signature_values_are_minimal_integers() {
        let tx = LegacyTransaction {
            chain_id: 1,
            nonce: U256::ZERO,
            gas_price: U256::ONE,
            gas: 21_000.as_u256(),
            to: Some(Address::from_slice(&[0; 20])),
            value: U256::ZERO,
            data: vec![],
        };
        let mut r = [0x11; 32];
        r[0] = 0;
        let signature = Signature::from_parts(0, r, [0x22; 32]).unwrap();

        let rlp::Item::List(fields) = rlp::decode(&tx.rlp_encode(Some(&signature))).unwrap()
        else {
            panic!("signed transaction is not an RLP list");
        };
        assert_eq!(fields[6], rlp::Item::Bytes(vec![37]));
        assert_eq!(fields[7], rlp::Item::Bytes(vec![0x11; 31]));
        assert_eq!(fields[8], rlp::Item::Bytes(vec![0x22; 32]));
    }
}
