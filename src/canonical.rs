//! Canonical byte representations of integers, hexadecimal strings and
//! decimal denominations.
//!
//! RLP requires integers to be encoded as their shortest big-endian byte
//! string, with zero being the *empty* string rather than a single `0x00`
//! byte. Everything that ends up in a transaction field goes through here.

use anyhow::{bail, ensure, Context as _, Result};
use ethnum::U256;

/// Number of decimals between Ether and Wei.
pub const ETHER: u32 = 18;

/// Number of decimals between Gwei and Wei.
pub const GWEI: u32 = 9;

/// Returns the minimal big-endian byte representation of an unsigned
/// integer. Zero is represented by the empty byte string.
pub fn uint(value: U256) -> Vec<u8> {
    let start = value.leading_zeros() / 8;
    value.to_be_bytes()[start as usize..].to_vec()
}

/// Strips an optional `0x` prefix from a hexadecimal string.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decodes a hexadecimal string with an optional `0x` prefix. Both the empty
/// string and a lone `0x` decode to an empty byte string.
///
/// Strings with an odd number of digits are rejected instead of being
/// padded.
pub fn hex(s: &str) -> Result<Vec<u8>> {
    let digits = strip_hex_prefix(s.trim());
    ensure!(
        digits.len() % 2 == 0,
        "hex string has an odd number of digits ({})",
        digits.len(),
    );
    hex::decode(digits).with_context(|| format!("invalid hex string '{s}'"))
}

/// Decodes a hexadecimal string into a fixed-size byte array.
pub fn fixed_hex<const N: usize>(s: &str) -> Result<[u8; N]> {
    let bytes = hex(s)?;
    bytes.as_slice().try_into().ok().with_context(|| {
        format!(
            "expected {N} bytes ({} hex characters) but got {}",
            N * 2,
            bytes.len(),
        )
    })
}

/// Parses an unsigned integer from a decimal or `0x`-prefixed hexadecimal
/// string. The empty string and a lone `0x` are zero.
pub fn integer(s: &str) -> Result<U256> {
    let s = s.trim();
    let digits = strip_hex_prefix(s);
    let radix = if digits.len() < s.len() { 16 } else { 10 };
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, radix).with_context(|| format!("invalid integer '{s}'"))
}

/// Converts a human-entered decimal amount into an integer amount of its
/// base unit, where one whole unit is `10^decimals` base units.
///
/// The conversion is exact: digits beyond the base unit's precision are
/// truncated (floored), never rounded. Scientific notation such as `1e-3`
/// is accepted, since that is how JSON numbers may be rendered.
pub fn units(amount: &str, decimals: u32) -> Result<U256> {
    let amount = amount.trim();
    ensure!(!amount.starts_with('-'), "amount '{amount}' is negative");

    let unsigned = amount.strip_prefix('+').unwrap_or(amount);
    let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent
                .parse::<i64>()
                .with_context(|| format!("invalid exponent in amount '{amount}'"))?,
        ),
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    ensure!(
        !(whole.is_empty() && fraction.is_empty())
            && whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()),
        "invalid decimal amount '{amount}'",
    );

    let digits = format!("{whole}{fraction}");
    let digits = digits.trim_start_matches('0');
    let scale = i64::from(decimals)
        .checked_add(exponent)
        .and_then(|scale| scale.checked_sub(fraction.len() as i64))
        .with_context(|| format!("exponent in amount '{amount}' is out of range"))?;

    let digits = if scale >= 0 {
        digits
    } else {
        let truncated = digits.len().saturating_sub(scale.unsigned_abs() as usize);
        &digits[..truncated]
    };
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    let mut value = U256::from_str_radix(digits, 10)
        .with_context(|| format!("amount '{amount}' overflows a 256-bit integer"))?;
    for _ in 0..scale.max(0) {
        value = match value.checked_mul(U256::new(10)) {
            Some(value) => value,
            None => bail!("amount '{amount}' overflows a 256-bit integer"),
        };
    }
    Ok(value)
}
