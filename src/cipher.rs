//! Demonstration public key "encryption".
//!
//! The symmetric key is the SHA-256 digest of the recipient's uncompressed
//! public key and messages are encrypted with AES-256-CBC and PKCS#7
//! padding. Anyone who knows the public key can decrypt, so this is **not**
//! ECIES and offers no confidentiality. It exists to illustrate the
//! mechanics of a cipher round trip.

use crate::{
    account::{PrivateKey, PublicKey},
    hash, rand,
};
use aes::Aes256;
use anyhow::{ensure, Context as _, Result};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _};

type Encryptor = cbc::Encryptor<Aes256>;
type Decryptor = cbc::Decryptor<Aes256>;

/// Length of the CBC initialization vector.
pub const IV_LEN: usize = 16;

/// An encrypted message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Encrypted {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
}

/// Derives the AES-256 key for a public key.
pub fn key(public: &PublicKey) -> [u8; 32] {
    hash::sha256(public.encode_uncompressed())
}

/// Encrypts a message for a public key with a fresh random IV.
pub fn encrypt(public: &PublicKey, plaintext: &[u8]) -> Result<Encrypted> {
    let iv = rand::bytes::<IV_LEN>().context("failed to generate IV")?;
    Ok(encrypt_with_iv(public, plaintext, iv))
}

/// Encrypts a message for a public key with the specified IV.
pub fn encrypt_with_iv(public: &PublicKey, plaintext: &[u8], iv: [u8; IV_LEN]) -> Encrypted {
    let ciphertext =
        Encryptor::new(&key(public).into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Encrypted { ciphertext, iv }
}

/// Decrypts a message.
///
/// The private key must belong to the public key. A ciphertext that does
/// not decrypt to valid padding and UTF-8 text is an error, never returned
/// as a successful result.
pub fn decrypt(private: &PrivateKey, public: &PublicKey, encrypted: &Encrypted) -> Result<String> {
    ensure!(
        private.public() == *public,
        "private key does not match the public key",
    );
    ensure!(
        !encrypted.ciphertext.is_empty() && encrypted.ciphertext.len() % IV_LEN == 0,
        "ciphertext length {} is not a positive multiple of the block size",
        encrypted.ciphertext.len(),
    );
    let plaintext = Decryptor::new(&key(public).into(), &encrypted.iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&encrypted.ciphertext)
        .ok()
        .context("decryption failed: bad padding, wrong key or IV")?;
    String::from_utf8(plaintext).context("decrypted message is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use hex_literal::hex;

    const IV: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

    fn keys() -> (PrivateKey, PublicKey) {
        let key = PrivateKey::new(testing::PRIVATE_KEY).unwrap();
        let public = key.public();
        (key, public)
    }

    #[test]
    fn key_derivation() {
        let (_, public) = keys();
        assert_eq!(
            key(&public),
            hex!("6950aa1de19ec15be6e74f9abdf6c8ae897e6b22f481f176a0d9e6f6f9e93eeb"),
        );
    }

    #[test]
    fn known_ciphertext() {
        let (private, public) = keys();
        let encrypted = encrypt_with_iv(&public, b"Hello, Bob!", IV);
        assert_eq!(encrypted.ciphertext, hex!("5d5995c17367049c33f12c60f217c394"));
        assert_eq!(decrypt(&private, &public, &encrypted).unwrap(), "Hello, Bob!");
    }

    #[test]
    fn round_trip_with_random_iv() {
        let (private, public) = keys();
        let message = "Grüße, Bob! A message that spans multiple AES blocks.";
        let encrypted = encrypt(&public, message.as_bytes()).unwrap();
        assert_eq!(encrypted.ciphertext.len() % IV_LEN, 0);
        assert_eq!(decrypt(&private, &public, &encrypted).unwrap(), message);
        assert_ne!(encrypt(&public, message.as_bytes()).unwrap().iv, encrypted.iv);
    }

    #[test]
    fn mismatched_keys_fail() {
        let (_, public) = keys();
        let other = PrivateKey::new([0x42; 32]).unwrap();
        let encrypted = encrypt_with_iv(&public, b"Hello, Bob!", IV);
        assert!(decrypt(&other, &public, &encrypted).is_err());
        assert!(decrypt(&other, &other.public(), &encrypted).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let (private, public) = keys();
        let mut encrypted = encrypt_with_iv(&public, b"Hello, Bob!", IV);
        encrypted.ciphertext[15] ^= 0xff;
        assert!(decrypt(&private, &public, &encrypted).is_err());
        encrypted.ciphertext.truncate(8);
        assert!(decrypt(&private, &public, &encrypted).is_err());
    }
}
