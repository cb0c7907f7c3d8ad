//! Identifiers used throughout BundleSwap.
//!
//! Accounts use UUIDv7. Asset contracts are addressed by a 20-byte address.
//! Offer ids are arena indices: they are handed out in creation order and
//! are never reused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SwapError;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A party that can own assets: a maker, a taker, or the custodian itself.
///
/// The host supplies the caller's `AccountId` for every mutating operation;
/// the escrow never derives it from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ContractAddress
// ---------------------------------------------------------------------------

/// Address of an external asset contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ContractAddress(pub [u8; 20]);

impl ContractAddress {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// First four bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ContractAddress {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| SwapError::Serialization(format!("contract address {s:?}: {e}")))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|raw: Vec<u8>| {
            SwapError::Serialization(format!(
                "contract address {s:?}: expected 20 bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Token id inside a non-fungible (or multi-unit) asset contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub u128);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Offer ids
// ---------------------------------------------------------------------------

/// Index of a displayed offer in its append-only arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DisplayedOfferId(pub u64);

impl fmt::Display for DisplayedOfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "displayed:{}", self.0)
    }
}

/// Index of a defined (counter) offer in its append-only arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DefinedOfferId(pub u64);

impl fmt::Display for DefinedOfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "defined:{}", self.0)
    }
}

/// Either kind of offer id. Used where an operation applies to both arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferRef {
    Displayed(DisplayedOfferId),
    Defined(DefinedOfferId),
}

impl fmt::Display for OfferRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Displayed(id) => id.fmt(f),
            Self::Defined(id) => id.fmt(f),
        }
    }
}

impl From<DisplayedOfferId> for OfferRef {
    fn from(id: DisplayedOfferId) -> Self {
        Self::Displayed(id)
    }
}

impl From<DefinedOfferId> for OfferRef {
    fn from(id: DefinedOfferId) -> Self {
        Self::Defined(id)
    }
}

/// Handle to a bundle stored in the bundle registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BundleHandle(pub u64);

impl fmt::Display for BundleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bundle:{}", self.0)
    }
}

/// Deterministic fixtures. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    /// An account whose UUID bytes are all `tag`.
    #[must_use]
    pub fn fixed(tag: u8) -> Self {
        Self::from_bytes([tag; 16])
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ContractAddress {
    /// A contract address whose bytes are all `tag`.
    #[must_use]
    pub fn fixed(tag: u8) -> Self {
        Self([tag; 20])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_uniqueness() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn contract_address_display_is_prefixed_hex() {
        let addr = ContractAddress::fixed(0xab);
        let shown = addr.to_string();
        assert!(shown.starts_with("0xabab"), "Got: {shown}");
        assert_eq!(shown.len(), 2 + 40);
        assert_eq!(addr.short(), "abababab");
    }

    #[test]
    fn contract_address_parses_with_and_without_prefix() {
        let addr = ContractAddress::fixed(0x11);
        let with: ContractAddress = addr.to_string().parse().unwrap();
        let without: ContractAddress = hex::encode(addr.0).parse().unwrap();
        assert_eq!(with, addr);
        assert_eq!(without, addr);
    }

    #[test]
    fn contract_address_rejects_wrong_length() {
        let err = "0xdeadbeef".parse::<ContractAddress>().unwrap_err();
        assert!(matches!(err, SwapError::Serialization(_)));
    }

    #[test]
    fn offer_ref_display_names_the_arena() {
        assert_eq!(OfferRef::from(DisplayedOfferId(3)).to_string(), "displayed:3");
        assert_eq!(OfferRef::from(DefinedOfferId(0)).to_string(), "defined:0");
    }

    #[test]
    fn serde_roundtrips() {
        let account = AccountId::new();
        let json = serde_json::to_string(&account).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(account, back);

        let offer = OfferRef::Defined(DefinedOfferId(9));
        let json = serde_json::to_string(&offer).unwrap();
        let back: OfferRef = serde_json::from_str(&json).unwrap();
        assert_eq!(offer, back);
    }
}
