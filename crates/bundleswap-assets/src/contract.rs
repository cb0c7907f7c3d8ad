//! The boundary to external asset contracts.
//!
//! An asset contract advertises which transfer interfaces it implements via
//! [`AssetContract::supports_interface`] and exposes each one through a
//! capability accessor. [`probe`] turns that runtime introspection into an
//! explicit [`NonFungibleKind`] so the adapter dispatches on a tagged
//! variant instead of guessing.

use bundleswap_types::{AccountId, ContractAddress, Result, SwapError, TokenId, constants};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Four-byte interface identifier used for capability introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceId(pub [u8; 4]);

impl InterfaceId {
    pub const SINGLE_OWNER: Self = Self(constants::SINGLE_OWNER_INTERFACE_ID);
    pub const MULTI_UNIT: Self = Self(constants::MULTI_UNIT_INTERFACE_ID);
    pub const FUNGIBLE: Self = Self(constants::FUNGIBLE_INTERFACE_ID);
}

/// Single-owner-per-token standard: each token id has exactly one owner.
pub trait SingleOwnerAsset {
    fn owner_of(&self, token: TokenId) -> Option<AccountId>;

    /// Whether `operator` may move `token` out of `owner`'s account.
    fn is_authorized(&self, owner: AccountId, operator: AccountId, token: TokenId) -> bool;

    fn transfer_from(
        &mut self,
        operator: AccountId,
        from: AccountId,
        to: AccountId,
        token: TokenId,
    ) -> Result<()>;
}

/// Multi-unit-per-token standard: accounts hold a unit balance per token id.
pub trait MultiUnitAsset {
    fn balance_of(&self, owner: AccountId, token: TokenId) -> u64;

    fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool;

    fn safe_transfer_from(
        &mut self,
        operator: AccountId,
        from: AccountId,
        to: AccountId,
        token: TokenId,
        amount: u64,
        data: &[u8],
    ) -> Result<()>;
}

/// Fungible, allowance-gated standard.
pub trait FungibleAsset {
    fn balance_of(&self, owner: AccountId) -> Decimal;

    fn allowance(&self, owner: AccountId, spender: AccountId) -> Decimal;

    fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<()>;
}

/// An external asset contract.
///
/// Capability accessors default to `None`; an implementation overrides the
/// ones matching the interfaces it reports through `supports_interface`.
pub trait AssetContract: Send + Sync {
    fn supports_interface(&self, interface: InterfaceId) -> bool;

    fn single_owner(&self) -> Option<&dyn SingleOwnerAsset> {
        None
    }
    fn single_owner_mut(&mut self) -> Option<&mut dyn SingleOwnerAsset> {
        None
    }
    fn multi_unit(&self) -> Option<&dyn MultiUnitAsset> {
        None
    }
    fn multi_unit_mut(&mut self) -> Option<&mut dyn MultiUnitAsset> {
        None
    }
    fn fungible(&self) -> Option<&dyn FungibleAsset> {
        None
    }
    fn fungible_mut(&mut self) -> Option<&mut dyn FungibleAsset> {
        None
    }
}

/// Which single-unit transfer a non-fungible entry needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonFungibleKind {
    /// `transfer_from(from, to, token)`.
    SingleOwner,
    /// `safe_transfer_from(from, to, token, 1, data)`.
    MultiUnit,
}

impl std::fmt::Display for NonFungibleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleOwner => write!(f, "SINGLE_OWNER"),
            Self::MultiUnit => write!(f, "MULTI_UNIT"),
        }
    }
}

/// Decide how to move a non-fungible unit held by `contract`.
///
/// Single-owner is tried first. A contract that advertises an interface but
/// does not expose the matching capability is treated as malformed.
///
/// # Errors
/// Returns `UnsupportedAsset` if neither non-fungible interface is usable.
pub fn probe(address: ContractAddress, contract: &dyn AssetContract) -> Result<NonFungibleKind> {
    if contract.supports_interface(InterfaceId::SINGLE_OWNER) {
        return match contract.single_owner() {
            Some(_) => Ok(NonFungibleKind::SingleOwner),
            None => Err(malformed(address, "single-owner")),
        };
    }
    if contract.supports_interface(InterfaceId::MULTI_UNIT) {
        return match contract.multi_unit() {
            Some(_) => Ok(NonFungibleKind::MultiUnit),
            None => Err(malformed(address, "multi-unit")),
        };
    }
    Err(SwapError::UnsupportedAsset {
        contract: address,
        reason: "implements no non-fungible transfer interface".into(),
    })
}

/// Check that `contract` can be used for fungible entries.
///
/// # Errors
/// Returns `UnsupportedAsset` if the fungible interface is missing or not
/// exposed.
pub fn probe_fungible(address: ContractAddress, contract: &dyn AssetContract) -> Result<()> {
    if !contract.supports_interface(InterfaceId::FUNGIBLE) {
        return Err(SwapError::UnsupportedAsset {
            contract: address,
            reason: "does not implement the fungible interface".into(),
        });
    }
    contract
        .fungible()
        .map(|_| ())
        .ok_or_else(|| malformed(address, "fungible"))
}

fn malformed(address: ContractAddress, interface: &str) -> SwapError {
    SwapError::UnsupportedAsset {
        contract: address,
        reason: format!("advertises the {interface} interface but does not expose it"),
    }
}
