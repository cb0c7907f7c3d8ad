//! Shared, async handle to a [`SwapCoordinator`].
//!
//! Every mutation holds the write lock for its whole duration, so two
//! operations never interleave. Reads take the read lock and see either the
//! state before a mutation or the state after it. Asset calls are
//! synchronous; nothing is awaited while the lock is held.

use std::sync::Arc;

use bundleswap_types::{
    AccountId, Bundle, DefinedOffer, DefinedOfferId, DisplayedOffer, DisplayedOfferId,
    OfferSnapshot, Result,
};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::coordinator::SwapCoordinator;

/// Cloneable handle; all clones share one coordinator.
#[derive(Clone)]
pub struct SwapDesk {
    inner: Arc<RwLock<SwapCoordinator>>,
}

impl SwapDesk {
    #[must_use]
    pub fn new(coordinator: SwapCoordinator) -> Self {
        Self {
            inner: Arc::new(RwLock::new(coordinator)),
        }
    }

    pub async fn display_offer(&self, caller: AccountId, name: &str, bundle: &Bundle) -> Result<DisplayedOfferId> {
        self.inner.write().await.display_offer(caller, name, bundle)
    }

    pub async fn define_offer(
        &self,
        caller: AccountId,
        name: &str,
        displayed_offer_id: DisplayedOfferId,
        bundle: &Bundle,
    ) -> Result<DefinedOfferId> {
        self.inner
            .write()
            .await
            .define_offer(caller, name, displayed_offer_id, bundle)
    }

    pub async fn cancel_displayed_offer(&self, caller: AccountId, id: DisplayedOfferId) -> Result<()> {
        self.inner.write().await.cancel_displayed_offer(caller, id)
    }

    pub async fn cancel_defined_offer(&self, caller: AccountId, id: DefinedOfferId) -> Result<()> {
        self.inner.write().await.cancel_defined_offer(caller, id)
    }

    pub async fn accept_offer(
        &self,
        caller: AccountId,
        displayed_id: DisplayedOfferId,
        defined_id: DefinedOfferId,
    ) -> Result<()> {
        self.inner
            .write()
            .await
            .accept_offer(caller, displayed_id, defined_id)
    }

    pub async fn displayed_offer(&self, id: DisplayedOfferId) -> Result<OfferSnapshot<DisplayedOffer>> {
        self.inner.read().await.displayed_offer(id)
    }

    pub async fn defined_offer(&self, id: DefinedOfferId) -> Result<OfferSnapshot<DefinedOffer>> {
        self.inner.read().await.defined_offer(id)
    }

    pub async fn verify_custody(&self) -> Result<()> {
        self.inner.read().await.verify_custody()
    }

    /// Read access to the whole coordinator.
    pub async fn read(&self) -> RwLockReadGuard<'_, SwapCoordinator> {
        self.inner.read().await
    }

    /// Exclusive access, e.g. to register contracts or observers.
    pub async fn write(&self) -> RwLockWriteGuard<'_, SwapCoordinator> {
        self.inner.write().await
    }
}
