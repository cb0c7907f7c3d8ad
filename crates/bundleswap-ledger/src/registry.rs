//! Bundle registry — offer-owned copies of deposited bundles.
//!
//! `save` takes the caller's bundle by reference and stores a deep copy, so
//! nothing the caller does to its own buffer afterwards can change what an
//! offer holds. Entries are never removed or reindexed.

use bundleswap_types::{Bundle, BundleHandle};

/// Append-only arena of bundles.
#[derive(Debug, Default)]
pub struct BundleRegistry {
    bundles: Vec<Bundle>,
}

impl BundleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `bundle` and return its handle.
    pub fn save(&mut self, bundle: &Bundle) -> BundleHandle {
        let handle = BundleHandle(self.bundles.len() as u64);
        self.bundles.push(bundle.clone());
        handle
    }

    #[must_use]
    pub fn get(&self, handle: BundleHandle) -> Option<&Bundle> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|idx| self.bundles.get(idx))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
