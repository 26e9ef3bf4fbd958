mod util;

use crate::util::Keylab;
use keylab::account::PrivateKey;

#[test]
fn generates_key_pairs() {
    let pair = Keylab::json("keypair", &[]);
    let key = PrivateKey::from_hex(pair["privateKey"].as_str().unwrap()).unwrap();
    assert_eq!(
        pair["publicKey"],
        hex::encode(key.public().encode_uncompressed())
    );
    assert_eq!(
        pair["address"],
        format!("0x{}", hex::encode(*key.address()))
    );
}

#[test]
fn signs_with_session_key_pair() {
    let session = util::session_path("keypair");
    let session = session.to_str().unwrap();
    let pair = Keylab::json("keypair", &["--session", session]);

    let signature = Keylab::new("sign", &["--session", session, "--signature-only", "hello"])
        .without_private_key()
        .execute()
        .unwrap();

    let verified = Keylab::new(
        "verify",
        &[
            "--public-key",
            pair["publicKey"].as_str().unwrap(),
            "--signature",
            &signature,
            "hello",
        ],
    )
    .execute()
    .unwrap();
    assert!(verified.contains(r#""isValid": true"#));

    std::fs::remove_file(session).unwrap();
}

#[test]
fn errors_without_private_key() {
    assert!(Keylab::new("sign", &["hello"])
        .without_private_key()
        .execute()
        .is_err());
}
