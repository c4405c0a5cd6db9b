//! Chain-facing value types
//!
//! Plain newtypes shared by every layer: account/contract addresses,
//! collateral token ids and base-unit token amounts. These types carry no
//! provider knowledge; parsing and formatting of human-entered amounts lives
//! in [`crate::domain::amount`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a 20-byte hex address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must be 40 hex digits, got {0}")]
    BadLength(usize),

    #[error("address contains a non-hex digit: '{0}'")]
    BadDigit(char),
}

/// A 20-byte account or contract address
///
/// Displayed and parsed as `0x`-prefixed lowercase hex. Serialized as the
/// same string form so configuration files stay readable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address, returned by contracts for unset slots
    pub const ZERO: Address = Address([0u8; 20]);

    /// Creates an address from raw bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parses a hex address with or without a `0x` prefix
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let hex = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        if hex.len() != 40 {
            return Err(AddressError::BadLength(hex.len()));
        }

        let mut bytes = [0u8; 20];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = hex_digit(hex.as_bytes()[i * 2])?;
            let lo = hex_digit(hex.as_bytes()[i * 2 + 1])?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// Short `0x1234abcd...` form for status lines
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...", &full[..10])
    }
}

fn hex_digit(raw: u8) -> Result<u8, AddressError> {
    match raw {
        b'0'..=b'9' => Ok(raw - b'0'),
        b'a'..=b'f' => Ok(raw - b'a' + 10),
        b'A'..=b'F' => Ok(raw - b'A' + 10),
        other => Err(AddressError::BadDigit(other as char)),
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// Identifier of a single collateral NFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token amount in base units (18 decimals)
///
/// `u128` covers the full practical range of 18-decimal amounts; the pack
/// carries no big-integer dependency and neither does this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trip() {
        let text = "0x00a329c0648769a73afac7f9381e08fb43dbea72";
        let addr = Address::parse(text).unwrap();
        assert_eq!(addr.to_string(), text);
    }

    #[test]
    fn address_accepts_uppercase_and_bare_hex() {
        let bare = Address::parse("00A329C0648769A73AFAC7F9381E08FB43DBEA72").unwrap();
        let prefixed = Address::parse("0x00a329c0648769a73afac7f9381e08fb43dbea72").unwrap();
        assert_eq!(bare, prefixed);
    }

    #[test]
    fn address_rejects_bad_input() {
        assert_eq!(Address::parse("0x1234"), Err(AddressError::BadLength(4)));
        assert!(matches!(
            Address::parse("0xzza329c0648769a73afac7f9381e08fb43dbea72"),
            Err(AddressError::BadDigit('z'))
        ));
    }

    #[test]
    fn address_short_form() {
        let addr = Address::parse("0x00a329c0648769a73afac7f9381e08fb43dbea72").unwrap();
        assert_eq!(addr.short(), "0x00a329c0...");
    }

    #[test]
    fn zero_address_displays_all_zeros() {
        assert_eq!(
            Address::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn address_serde_uses_string_form() {
        let addr = Address::parse("0x00a329c0648769a73afac7f9381e08fb43dbea72").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x00a329c0648769a73afac7f9381e08fb43dbea72\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
