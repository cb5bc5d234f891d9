use crate::error::{LedgerError, Result};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LEN: usize = 20;
const ADDRESS_PREFIX: &str = "0x";

/// 20-byte account identifier, printed as `0x` followed by 40 hex chars
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, bincode::Encode, bincode::Decode,
)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Parse a `0x`-prefixed hex address. Mixed case is accepted.
    pub fn parse(input: &str) -> Result<Address> {
        let hex = input
            .strip_prefix(ADDRESS_PREFIX)
            .or_else(|| input.strip_prefix("0X"))
            .ok_or_else(|| LedgerError::InvalidAddress(format!("{input}: missing 0x prefix")))?;
        if hex.len() != ADDRESS_LEN * 2 {
            return Err(LedgerError::InvalidAddress(format!(
                "{input}: expected {} hex characters, got {}",
                ADDRESS_LEN * 2,
                hex.len()
            )));
        }
        let bytes = HEXLOWER_PERMISSIVE
            .decode(hex.as_bytes())
            .map_err(|e| LedgerError::InvalidAddress(format!("{input}: {e}")))?;
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }

    /// Deterministic address for a named account: the first 20 bytes of sha256(seed)
    pub fn from_seed(seed: &str) -> Address {
        let digest = crate::utils::sha256_digest(seed.as_bytes());
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[..ADDRESS_LEN]);
        Address(out)
    }

    /// Accept either a literal address or a seed label
    pub fn resolve(input: &str) -> Result<Address> {
        if input.starts_with(ADDRESS_PREFIX) || input.starts_with("0X") {
            Address::parse(input)
        } else if input.trim().is_empty() {
            Err(LedgerError::InvalidAddress("empty account name".to_string()))
        } else {
            Ok(Address::from_seed(input))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

pub fn validate_address(input: &str) -> bool {
    Address::parse(input).is_ok()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ADDRESS_PREFIX}{}", HEXLOWER.encode(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Address::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(serde::de::Error::custom)
    }
}
