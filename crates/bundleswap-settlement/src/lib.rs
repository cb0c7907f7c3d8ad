//! # bundleswap-settlement
//!
//! **Swap plane**: the coordinator that turns a listing and one of its
//! counter-offers into an atomic exchange, and the shared desk handle.
//!
//! ## Architecture
//!
//! 1. **SwapCoordinator**: external facade over the offer ledger, the asset
//!    adapter and the event log; owns the desk configuration
//! 2. **SwapDesk**: `Arc<RwLock<SwapCoordinator>>` for concurrent callers,
//!    one writer at a time
//!
//! ## Settlement Flow
//!
//! ```text
//! checks → preflight → retire both → displayed bundle → defined maker
//!                                   → defined bundle  → displayed maker
//!                                   └─ any failure → unwind + restore flags
//! ```

pub mod coordinator;
pub mod desk;

pub use coordinator::SwapCoordinator;
pub use desk::SwapDesk;

pub use bundleswap_ledger::{NoopObserver, SettlementObserver};
