//! Bundle model: the unit of value an offer puts into escrow.
//!
//! A bundle is a list of non-fungible unit references plus a list of
//! fungible amounts. Order is preserved for display and for the transfer
//! sequence, but two bundles with the same entries in a different order are
//! worth the same.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ContractAddress, Result, SwapError, TokenId};

/// One non-fungible unit: a token id inside an asset contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub contract: ContractAddress,
    pub token_id: TokenId,
}

impl AssetRef {
    #[must_use]
    pub fn new(contract: ContractAddress, token_id: TokenId) -> Self {
        Self { contract, token_id }
    }
}

/// A quantity of one fungible asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FungibleRef {
    pub contract: ContractAddress,
    pub amount: Decimal,
}

impl FungibleRef {
    #[must_use]
    pub fn new(contract: ContractAddress, amount: Decimal) -> Self {
        Self { contract, amount }
    }
}

/// A set of assets moved as one all-or-nothing unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Non-fungible units.
    pub assets: Vec<AssetRef>,
    /// Fungible amounts.
    pub fungibles: Vec<FungibleRef>,
}

impl Bundle {
    #[must_use]
    pub fn new(assets: Vec<AssetRef>, fungibles: Vec<FungibleRef>) -> Self {
        Self { assets, fungibles }
    }

    /// Builder-style: append a non-fungible unit.
    #[must_use]
    pub fn with_asset(mut self, contract: ContractAddress, token_id: TokenId) -> Self {
        self.assets.push(AssetRef::new(contract, token_id));
        self
    }

    /// Builder-style: append a fungible amount.
    #[must_use]
    pub fn with_fungible(mut self, contract: ContractAddress, amount: Decimal) -> Self {
        self.fungibles.push(FungibleRef::new(contract, amount));
        self
    }

    /// Total number of entries (non-fungible + fungible).
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len() + self.fungibles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.fungibles.is_empty()
    }

    /// Structural checks that do not need any asset contract.
    ///
    /// # Errors
    /// Returns `InvalidBundle` if the bundle has more than `max_entries`
    /// entries or carries a negative fungible amount.
    pub fn validate(&self, max_entries: usize) -> Result<()> {
        if self.len() > max_entries {
            return Err(SwapError::InvalidBundle {
                reason: format!("{} entries exceeds limit of {max_entries}", self.len()),
            });
        }
        if let Some(bad) = self.fungibles.iter().find(|f| f.amount < Decimal::ZERO) {
            return Err(SwapError::InvalidBundle {
                reason: format!("negative amount {} for {}", bad.amount, bad.contract),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nft() -> ContractAddress {
        ContractAddress::fixed(1)
    }

    fn coin() -> ContractAddress {
        ContractAddress::fixed(2)
    }

    #[test]
    fn builder_preserves_order() {
        let bundle = Bundle::default()
            .with_asset(nft(), TokenId(7))
            .with_asset(nft(), TokenId(3))
            .with_fungible(coin(), Decimal::new(100, 0));
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.assets[0].token_id, TokenId(7));
        assert_eq!(bundle.assets[1].token_id, TokenId(3));
        assert!(!bundle.is_empty());
    }

    #[test]
    fn empty_bundle_is_valid() {
        let bundle = Bundle::default();
        assert!(bundle.is_empty());
        assert!(bundle.validate(0).is_ok());
    }

    #[test]
    fn too_many_entries_rejected() {
        let bundle = Bundle::default()
            .with_asset(nft(), TokenId(1))
            .with_asset(nft(), TokenId(2));
        let err = bundle.validate(1).unwrap_err();
        assert!(matches!(err, SwapError::InvalidBundle { .. }));
    }

    #[test]
    fn negative_amount_rejected() {
        let bundle = Bundle::default().with_fungible(coin(), Decimal::new(-5, 0));
        let err = bundle.validate(10).unwrap_err();
        assert!(matches!(err, SwapError::InvalidBundle { .. }));
    }

    #[test]
    fn zero_amount_allowed() {
        let bundle = Bundle::default().with_fungible(coin(), Decimal::ZERO);
        assert!(bundle.validate(10).is_ok());
    }

    #[test]
    fn negative_zero_amount_allowed() {
        let mut amount = Decimal::ZERO;
        amount.set_sign_negative(true);
        assert!(amount.is_sign_negative());
        let bundle = Bundle::default().with_fungible(coin(), amount);
        assert!(bundle.validate(10).is_ok());
    }

    #[test]
    fn serde_roundtrip() {
        let bundle = Bundle::default()
            .with_asset(nft(), TokenId(7))
            .with_fungible(coin(), Decimal::new(12345, 2));
        let json = serde_json::to_string(&bundle).unwrap();
        let back: Bundle = serde_json::from_str(&json).unwrap();
        assert_eq!(bundle, back);
    }
}
