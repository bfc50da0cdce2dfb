// ledger-core/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since Unix epoch, always supplied by the caller
pub type Timestamp = u64;

/// Milliseconds in one UTC day
pub const MS_PER_DAY: u64 = 86_400_000;

/// Day number for a millisecond timestamp.
///
/// Daily limits roll over at UTC midnight regardless of the minter's
/// timezone; the anchor is deliberate and tested.
pub fn day_number(timestamp: Timestamp) -> u64 {
    timestamp / MS_PER_DAY
}

/// Address size in bytes
pub const ADDRESS_SIZE: usize = 20;

/// A 20-byte account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Create address from bytes
    pub fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// The all-zero address
    pub fn zero() -> Self {
        Self([0u8; ADDRESS_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressParseError(e.to_string()))?;
        if bytes.len() != ADDRESS_SIZE {
            return Err(AddressParseError(format!(
                "expected {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            )));
        }
        let mut address = [0u8; ADDRESS_SIZE];
        address.copy_from_slice(&bytes);
        Ok(Self(address))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Address({}...{})",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[16..])
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Error parsing an address from hex
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_number() {
        assert_eq!(day_number(0), 0);
        assert_eq!(day_number(MS_PER_DAY - 1), 0);
        assert_eq!(day_number(MS_PER_DAY), 1);
        assert_eq!(day_number(10 * MS_PER_DAY + 5), 10);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::new([0xab; ADDRESS_SIZE]);
        let hex = addr.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn test_address_bad_length() {
        assert!(Address::from_hex("0xdeadbeef").is_err());
    }
}
