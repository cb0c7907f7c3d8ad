//! System-wide constants for the BundleSwap escrow.

/// Interface id of single-owner (one owner per token id) asset contracts.
pub const SINGLE_OWNER_INTERFACE_ID: [u8; 4] = [0x80, 0xac, 0x58, 0xcd];

/// Interface id of multi-unit (balance per token id) asset contracts.
pub const MULTI_UNIT_INTERFACE_ID: [u8; 4] = [0xd9, 0xb6, 0x7a, 0x26];

/// Interface id of fungible, allowance-gated asset contracts.
pub const FUNGIBLE_INTERFACE_ID: [u8; 4] = [0x36, 0x37, 0x2b, 0x07];

/// Units moved per multi-unit leg. A bundle entry always names one unit.
pub const MULTI_UNIT_LEG_AMOUNT: u64 = 1;

/// Default maximum number of entries (non-fungible + fungible) in a bundle.
pub const DEFAULT_MAX_BUNDLE_ENTRIES: usize = 64;

/// Default maximum offer name length, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 256;

/// Domain separator for the event log hash chain.
pub const EVENT_HASH_DOMAIN: &[u8] = b"bundleswap:event:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "BundleSwap";
