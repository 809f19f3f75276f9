//! Channel addresses: one deterministic ledger address per channel index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::symbols::{is_symbol_string, unbiased_symbols};

/// Number of symbols in a channel address (without any ledger suffix).
pub const ADDRESS_LEN: usize = 81;

/// An 81-symbol ledger address for one channel slot.
///
/// The ledger's own integrity suffix is not part of this value; ledger
/// clients add it when talking to the network.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelAddress(String);

impl ChannelAddress {
    /// Validate and wrap an address string.
    pub fn new(address: impl Into<String>) -> Result<Self, CoreError> {
        let address = address.into();
        if address.len() != ADDRESS_LEN {
            return Err(CoreError::InvalidAddress(format!(
                "expected {} symbols, got {}",
                ADDRESS_LEN,
                address.len()
            )));
        }
        if !is_symbol_string(&address) {
            return Err(CoreError::InvalidAddress(format!(
                "non-alphabet symbol in {}",
                address
            )));
        }
        Ok(Self(address))
    }

    /// Get the address symbols.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelAddress({}...)", &self.0[..16])
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelAddress {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ChannelAddress> for String {
    fn from(address: ChannelAddress) -> Self {
        address.0
    }
}

/// Derive the address of channel slot `index`.
pub fn derive_address(seed: &[u8], index: u64) -> ChannelAddress {
    let label = format!("address_{}", index);
    ChannelAddress(unbiased_symbols(seed, label.as_bytes(), ADDRESS_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_address_known_values() {
        assert_eq!(
            derive_address(b"test-seed", 0).as_str(),
            "PKPVDKPC9UGXWSNDRFUWKUBYLSWOMIZVBXEPESOVJFRWSMWNEACSLTPPKZXXCW9GSGMHHKDKPMSKMPUE9"
        );
        assert_eq!(
            derive_address(b"test-seed", 5).as_str(),
            "KOGRRXGGTTGQAXVFKSARKJ9PEAQRCICEBF9GPGUABZ9ULC9PLJFMEEUC9SDULZLGJIVZKNPVBVDNPZIBU"
        );
    }

    #[test]
    fn test_derive_address_deterministic() {
        for index in [0u64, 1, 42, 1_000_000] {
            assert_eq!(
                derive_address(b"seed", index),
                derive_address(b"seed", index)
            );
        }
    }

    #[test]
    fn test_addresses_differ_per_index_and_seed() {
        let a0 = derive_address(b"seed", 0);
        let a1 = derive_address(b"seed", 1);
        let b0 = derive_address(b"other", 0);
        assert_ne!(a0, a1);
        assert_ne!(a0, b0);
    }

    #[test]
    fn test_address_validation() {
        let valid = derive_address(b"seed", 3);
        assert_eq!(ChannelAddress::new(valid.as_str()).unwrap(), valid);

        assert!(ChannelAddress::new("ABC").is_err());
        assert!(ChannelAddress::new("a".repeat(ADDRESS_LEN)).is_err());
        assert!("9".repeat(ADDRESS_LEN).parse::<ChannelAddress>().is_ok());
    }
}
