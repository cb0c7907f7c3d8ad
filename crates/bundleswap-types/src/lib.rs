//! # bundleswap-types
//!
//! Shared types, errors, and configuration for the **BundleSwap** escrow.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`ContractAddress`], [`TokenId`], [`DisplayedOfferId`], [`DefinedOfferId`], [`OfferRef`], [`BundleHandle`]
//! - **Bundle model**: [`Bundle`], [`AssetRef`], [`FungibleRef`]
//! - **Offer model**: [`DisplayedOffer`], [`DefinedOffer`], [`OfferRecord`], [`OfferSnapshot`]
//! - **Events**: [`SwapEvent`]
//! - **Configuration**: [`DeskConfig`]
//! - **Errors**: [`SwapError`] with `SW_ERR_` prefix codes
//! - **Constants**: interface ids and default limits

pub mod bundle;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod offer;

// Re-export all primary types at crate root for ergonomic imports:
//   use bundleswap_types::{Bundle, DisplayedOffer, SwapError, ...};

pub use bundle::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use offer::*;

// Constants are accessed via `bundleswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
