//! Validation of user-submitted transaction signing requests.

use super::{LegacyTransaction, DEFAULT_CHAIN_ID};
use crate::{account::PrivateKey, canonical, serialization};
use anyhow::{bail, ensure, Context as _, Result};
use ethaddr::Address;
use ethnum::U256;
use serde::Deserialize;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The kind of transaction being assembled.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A plain value transfer to an account.
    Transfer,
    /// A contract deployment: no recipient, `data` is the creation code.
    Deploy,
    /// A contract call: `data` is the ABI encoded call.
    Call,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Mode::Transfer => "transfer",
            Mode::Deploy => "deploy",
            Mode::Call => "call",
        })
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "transfer" => Ok(Mode::Transfer),
            "deploy" => Ok(Mode::Deploy),
            "call" => Ok(Mode::Call),
            _ => bail!("invalid transaction mode '{s}', expected transfer, deploy or call"),
        }
    }
}

/// A transaction signing request as entered by a user.
///
/// Amounts are human denominated: `value` is in Ether and `gasPrice` in
/// Gwei. Integers may be JSON numbers, decimal strings or `0x`-prefixed
/// hexadecimal strings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub from: Option<String>,
    /// The recipient. A missing field and an explicit `null` are different:
    /// `null` requests a contract deployment.
    #[serde(default, deserialize_with = "serialization::nullable::deserialize")]
    pub to: Option<Option<String>>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub nonce: Option<String>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub gas_price: Option<String>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub gas_limit: Option<String>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub chain_id: Option<String>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub private_key: Option<String>,
    #[serde(default, deserialize_with = "serialization::text::deserialize")]
    pub data: Option<String>,
}

impl Request {
    /// Validates the request, returning the signing key and the transaction
    /// to sign.
    ///
    /// Validation fails without producing anything if a required field is
    /// missing or malformed, if the recipient and data do not fit the
    /// transaction mode, or if the private key does not belong to the
    /// `from` address.
    pub fn validate(&self) -> Result<(PrivateKey, LegacyTransaction)> {
        let missing = [
            ("from", &self.from),
            ("value", &self.value),
            ("nonce", &self.nonce),
            ("gasPrice", &self.gas_price),
            ("gasLimit", &self.gas_limit),
            ("privateKey", &self.private_key),
        ]
        .into_iter()
        .filter(|(_, field)| field.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
        ensure!(
            missing.is_empty(),
            "missing required transaction fields: {}",
            missing.join(", "),
        );

        let data = canonical::hex(self.data.as_deref().unwrap_or_default())
            .context("invalid data field")?;
        let to = match &self.to {
            None => None,
            Some(to) => Some(
                to.as_deref()
                    .map(str::trim)
                    .filter(|to| !to.is_empty() && *to != "0x")
                    .map(|to| address(to).context("invalid to address"))
                    .transpose()?,
            ),
        };
        let mode = self.mode.unwrap_or(match (&to, data.is_empty()) {
            (Some(None), _) => Mode::Deploy,
            (_, false) => Mode::Call,
            _ => Mode::Transfer,
        });
        let to = match (mode, to) {
            (Mode::Deploy, None | Some(None)) => None,
            (Mode::Deploy, Some(Some(_))) => {
                bail!("contract deployments must not specify a to address")
            }
            (_, Some(Some(to))) => Some(to),
            (_, _) => bail!(
                "to address is required for {mode} transactions \
                 (use null to deploy a contract)"
            ),
        };
        match mode {
            Mode::Transfer => ensure!(
                data.is_empty(),
                "transfer transactions must not carry data, use call mode instead",
            ),
            Mode::Deploy => ensure!(
                !data.is_empty(),
                "contract deployments require compiled bytecode as data",
            ),
            Mode::Call => ensure!(
                !data.is_empty(),
                "contract calls require ABI encoded call data",
            ),
        }

        let nonce = canonical::integer(field(&self.nonce)).context("invalid nonce")?;
        let gas = canonical::integer(field(&self.gas_limit)).context("invalid gas limit")?;
        ensure!(gas > U256::ZERO, "gas limit must be greater than zero");
        let gas_price =
            canonical::units(field(&self.gas_price), canonical::GWEI).context("invalid gas price")?;
        let value = canonical::units(field(&self.value), canonical::ETHER).context("invalid value")?;
        let chain_id = match self.chain_id.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_CHAIN_ID,
            Some(chain_id) => parse_chain_id(chain_id)?,
        };

        let key = PrivateKey::from_hex(field(&self.private_key))?;
        let from = address(field(&self.from)).context("invalid from address")?;
        let derived = key.address();
        ensure!(
            derived == from,
            "private key does not match the from address 0x{}; derived address: 0x{}",
            hex::encode(*from),
            hex::encode(*derived),
        );

        Ok((
            key,
            LegacyTransaction {
                nonce,
                gas_price,
                gas,
                to,
                value,
                data,
                chain_id,
            },
        ))
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default().trim()
}

/// Parses a 20-byte address, comparing case-insensitively: checksums are
/// not enforced.
fn address(s: &str) -> Result<Address> {
    let bytes = canonical::fixed_hex::<20>(s)?;
    Ok(Address::from_slice(&bytes))
}

fn parse_chain_id(s: &str) -> Result<u64> {
    let value = canonical::integer(s).context("invalid chain ID")?;
    ensure!(value > U256::ZERO, "chain ID must be greater than zero");
    ensure!(value.leading_zeros() >= 192, "chain ID {value} does not fit in 64 bits");
    let bytes = value.to_be_bytes();
    let mut low = [0; 8];
    low.copy_from_slice(&bytes[24..]);
    Ok(u64::from_be_bytes(low))
}
