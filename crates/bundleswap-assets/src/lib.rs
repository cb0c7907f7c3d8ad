//! # bundleswap-assets
//!
//! **Asset boundary**: everything that touches external asset contracts.
//!
//! ## Architecture
//!
//! 1. **AssetContract**: the collaborator trait, with capability accessors
//!    for the single-owner, multi-unit and fungible transfer interfaces
//! 2. **probe**: explicit capability introspection → [`NonFungibleKind`]
//! 3. **AssetTransferAdapter**: plans, pre-flights and executes whole-bundle
//!    transfers, unwinding executed legs on failure
//! 4. **memory**: in-memory reference contracts for running without a host
//!
//! ## Transfer Flow
//!
//! ```text
//! Bundle → plan() → preflight() → execute legs (on_leg after each)
//!                                    └─ failure → unwind() newest first
//! ```

pub mod adapter;
pub mod contract;
pub mod memory;

pub use adapter::{AssetTransferAdapter, LegKind, TransferLeg};
pub use contract::{
    AssetContract, FungibleAsset, InterfaceId, MultiUnitAsset, NonFungibleKind, SingleOwnerAsset,
    probe, probe_fungible,
};
pub use memory::{FungibleToken, MultiUnitToken, SingleOwnerToken};
