//! # bundleswap-ledger
//!
//! **Escrow state**: what custody holds and on whose behalf.
//!
//! ## Architecture
//!
//! 1. **BundleRegistry**: append-only arena of deposited bundles; offers
//!    refer to their bundle by handle
//! 2. **OfferLedger**: the displayed and defined offer arenas, deposit on
//!    creation, cancel with refund, and the read-only acceptance checks
//! 3. **Retired**: token for offers flipped inactive by an in-flight
//!    operation, which can only be undone by consuming it
//! 4. **EventLog**: SHA-256 hash-chained record of every state change
//!
//! Offers are never removed. Their ids are indexes into their arena.

pub mod event_log;
pub mod offers;
pub mod registry;

pub use event_log::{EventLog, EventRecord, GENESIS_HASH};
pub use offers::{AcceptPlan, NoopObserver, OfferLedger, Retired, SettlementObserver};
pub use registry::BundleRegistry;
