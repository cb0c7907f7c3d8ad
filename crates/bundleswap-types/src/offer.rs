//! # Offer records
//!
//! ```text
//!   ┌───────────┐  cancel (refund to maker)   ┌──────────┐
//!   │ AVAILABLE ├────────────────────────────▶│ INACTIVE │
//!   └─────┬─────┘                             └──────────┘
//!         │ accept (cross-transfer)                 ▲
//!         └─────────────────────────────────────────┘
//! ```
//!
//! `available` goes true → false exactly once. Nothing sets it back except
//! the rollback of an operation that failed, which leaves no observable trace.

use serde::{Deserialize, Serialize};

use crate::{
    AccountId, Bundle, BundleHandle, DefinedOfferId, DisplayedOfferId, OfferRef, Result, SwapError,
};

/// A listing: a bundle deposited by `maker` and waiting for counter-offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayedOffer {
    pub id: DisplayedOfferId,
    pub name: String,
    pub maker: AccountId,
    /// Custody copy of the deposited bundle.
    pub bundle: BundleHandle,
    pub available: bool,
}

/// A counter-offer against one displayed offer, backed by its own deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedOffer {
    pub id: DefinedOfferId,
    pub name: String,
    pub maker: AccountId,
    /// The listing this counter-offer answers. Fixed at creation.
    pub displayed_offer_id: DisplayedOfferId,
    pub bundle: BundleHandle,
    pub available: bool,
}

/// Fields shared by both offer kinds, so lifecycle checks are written once.
pub trait OfferRecord {
    fn offer_ref(&self) -> OfferRef;
    fn maker(&self) -> AccountId;
    fn bundle(&self) -> BundleHandle;
    fn is_available(&self) -> bool;
    fn set_available(&mut self, available: bool);

    /// Fails `Unauthorized` unless `caller` made this offer.
    fn ensure_maker(&self, caller: AccountId) -> Result<()> {
        if caller == self.maker() {
            Ok(())
        } else {
            Err(SwapError::Unauthorized {
                caller,
                maker: self.maker(),
            })
        }
    }

    /// Fails `AlreadyInactive` once the offer reached a terminal state.
    fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(SwapError::AlreadyInactive(self.offer_ref()))
        }
    }

    /// Terminal transition. Fails `AlreadyInactive` if already retired.
    fn retire(&mut self) -> Result<()> {
        self.ensure_available()?;
        self.set_available(false);
        Ok(())
    }
}

impl OfferRecord for DisplayedOffer {
    fn offer_ref(&self) -> OfferRef {
        OfferRef::Displayed(self.id)
    }
    fn maker(&self) -> AccountId {
        self.maker
    }
    fn bundle(&self) -> BundleHandle {
        self.bundle
    }
    fn is_available(&self) -> bool {
        self.available
    }
    fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

impl OfferRecord for DefinedOffer {
    fn offer_ref(&self) -> OfferRef {
        OfferRef::Defined(self.id)
    }
    fn maker(&self) -> AccountId {
        self.maker
    }
    fn bundle(&self) -> BundleHandle {
        self.bundle
    }
    fn is_available(&self) -> bool {
        self.available
    }
    fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

/// An offer record together with a copy of its bundle, as returned by the
/// read accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSnapshot<T> {
    pub offer: T,
    pub bundle: Bundle,
}
