//! Session context carried between operations.
//!
//! The current key pair, the last compiled contract bytecode and the last
//! encoded function call are kept in an explicit value instead of ambient
//! state. The CLI persists it as a JSON file so that, for example, a
//! `compile` followed by a `sign-transaction --mode deploy` picks up the
//! compiled bytecode.

use crate::{
    account::{KeyPair, PrivateKey},
    serialization,
    transaction::Mode,
};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

/// Session state.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(
        default,
        with = "serialization::bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    private_key: Option<Vec<u8>>,
    /// Creation code of the last compiled contract.
    #[serde(
        default,
        with = "serialization::bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub bytecode: Option<Vec<u8>>,
    /// Call data of the last encoded function call.
    #[serde(
        default,
        with = "serialization::bytes::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub call_data: Option<Vec<u8>>,
}

impl Session {
    /// Loads a session from a JSON file. A missing file is an empty session.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        serde_json::from_str(&json)
            .with_context(|| format!("invalid session file {}", path.display()))
    }

    /// Writes the session to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Returns the session's key pair, if one was stored.
    pub fn key_pair(&self) -> Result<Option<KeyPair>> {
        self.private_key
            .as_deref()
            .map(|secret| {
                let key = PrivateKey::new(secret).context("invalid private key in session")?;
                Ok(KeyPair::from(key))
            })
            .transpose()
    }

    /// Stores a key pair in the session, replacing any previous one.
    pub fn set_key_pair(&mut self, pair: &KeyPair) {
        self.private_key = Some(pair.private_key.secret().to_vec());
    }

    /// Returns the transaction data the session provides for a mode.
    pub fn data(&self, mode: Mode) -> Option<&[u8]> {
        match mode {
            Mode::Transfer => None,
            Mode::Deploy => self.bytecode.as_deref(),
            Mode::Call => self.call_data.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use serde_json::json;

    fn session() -> Session {
        let mut session = Session {
            bytecode: Some(vec![0x60, 0x80]),
            call_data: Some(vec![0xa9, 0x05, 0x9c, 0xbb]),
            ..Default::default()
        };
        session.set_key_pair(&KeyPair::from(
            PrivateKey::new(testing::PRIVATE_KEY).unwrap(),
        ));
        session
    }

    #[test]
    fn json_format() {
        assert_eq!(
            serde_json::to_value(session()).unwrap(),
            json!({
                "privateKey": format!("0x{}", hex::encode(testing::PRIVATE_KEY)),
                "bytecode": "0x6080",
                "callData": "0xa9059cbb",
            }),
        );
        assert_eq!(serde_json::to_value(Session::default()).unwrap(), json!({}));
    }

    #[test]
    fn data_per_mode() {
        let session = session();
        assert_eq!(session.data(Mode::Transfer), None);
        assert_eq!(session.data(Mode::Deploy), Some(&[0x60, 0x80][..]));
        assert_eq!(session.data(Mode::Call), Some(&[0xa9, 0x05, 0x9c, 0xbb][..]));
        assert_eq!(Session::default().data(Mode::Deploy), None);
    }

    #[test]
    fn key_pair() {
        let pair = session().key_pair().unwrap().unwrap();
        assert_eq!(*pair.address, testing::ADDRESS);
        assert!(Session::default().key_pair().unwrap().is_none());

        let corrupt = serde_json::from_value::<Session>(json!({ "privateKey": "0x00" })).unwrap();
        assert!(corrupt.key_pair().is_err());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("keylab-session-{}.json", std::process::id()));
        assert_eq!(Session::load(&path).unwrap(), Session::default());

        session().save(&path).unwrap();
        let loaded = Session::load(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), session());
    }
}
