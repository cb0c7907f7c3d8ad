//! Offer ledger — the two append-only offer arenas and their lifecycle.
//!
//! ## Creation
//!
//! 1. Deposit the bundle from the maker into custody (all or nothing)
//! 2. Store a deep copy of the bundle in the registry
//! 3. Append the offer record (available = true)
//!
//! If the deposit fails, no record is created.
//!
//! ## Cancellation
//!
//! Checks run first (`OutOfRange`, `Unauthorized`, `AlreadyInactive`). The
//! flag is flipped **before** the refund is dispatched, so anything observing
//! the ledger while the refund is in flight already sees the offer inactive.

use bundleswap_assets::{AssetTransferAdapter, TransferLeg};
use bundleswap_types::{
    AccountId, Bundle, BundleHandle, DefinedOffer, DefinedOfferId, DisplayedOffer,
    DisplayedOfferId, OfferRecord, OfferRef, OfferSnapshot, Result, SwapError,
};

use crate::registry::BundleRegistry;

/// Called after every individual transfer leg that moves assets out of
/// custody, with a read-only view of the ledger.
///
/// Returning an error rejects the leg and rolls the whole operation back.
pub trait SettlementObserver: Send + Sync {
    fn on_transfer(&mut self, leg: &TransferLeg, offers: &OfferLedger) -> Result<()>;
}

/// Observer that accepts every leg.
pub struct NoopObserver;

impl SettlementObserver for NoopObserver {
    fn on_transfer(&mut self, _leg: &TransferLeg, _offers: &OfferLedger) -> Result<()> {
        Ok(())
    }
}

impl SettlementObserver for Vec<Box<dyn SettlementObserver>> {
    fn on_transfer(&mut self, leg: &TransferLeg, offers: &OfferLedger) -> Result<()> {
        self.iter_mut()
            .try_for_each(|observer| observer.on_transfer(leg, offers))
    }
}

/// Everything a settlement needs, resolved by [`OfferLedger::validate_accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptPlan {
    pub displayed_id: DisplayedOfferId,
    pub defined_id: DefinedOfferId,
    pub displayed_maker: AccountId,
    pub defined_maker: AccountId,
    pub displayed_bundle: BundleHandle,
    pub defined_bundle: BundleHandle,
}

/// Proof that some offers were just retired by the current operation.
///
/// The only way to make an offer available again is [`Retired::rollback`],
/// which consumes the token. [`Retired::commit`] keeps the retirement.
#[must_use = "call commit or rollback"]
#[derive(Debug)]
pub struct Retired {
    offers: Vec<OfferRef>,
}

impl Retired {
    /// Undo the retirement after the operation that caused it failed.
    pub fn rollback(self, ledger: &mut OfferLedger) {
        for offer in self.offers.into_iter().rev() {
            ledger.set_available(offer, true);
            tracing::debug!(offer = %offer, "Retirement rolled back");
        }
    }

    /// Keep the retirement.
    pub fn commit(self) {
        tracing::debug!(offers = self.offers.len(), "Retirement committed");
    }

    #[must_use]
    pub fn offers(&self) -> &[OfferRef] {
        &self.offers
    }
}

/// Owns both offer arenas and the registry of their bundles.
#[derive(Debug, Default)]
pub struct OfferLedger {
    displayed: Vec<DisplayedOffer>,
    defined: Vec<DefinedOffer>,
    bundles: BundleRegistry,
}

impl OfferLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// # Errors
    /// Returns `OutOfRange` if no displayed offer has this id.
    pub fn displayed(&self, id: DisplayedOfferId) -> Result<&DisplayedOffer> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.displayed.get(idx))
            .ok_or(SwapError::OutOfRange(OfferRef::Displayed(id)))
    }

    /// # Errors
    /// Returns `OutOfRange` if no defined offer has this id.
    pub fn defined(&self, id: DefinedOfferId) -> Result<&DefinedOffer> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.defined.get(idx))
            .ok_or(SwapError::OutOfRange(OfferRef::Defined(id)))
    }

    /// The stored bundle behind `handle`.
    ///
    /// # Errors
    /// Returns `Internal` for a handle this ledger never issued.
    pub fn bundle(&self, handle: BundleHandle) -> Result<&Bundle> {
        self.bundles
            .get(handle)
            .ok_or_else(|| SwapError::Internal(format!("{handle} not in registry")))
    }

    pub fn displayed_snapshot(&self, id: DisplayedOfferId) -> Result<OfferSnapshot<DisplayedOffer>> {
        let offer = self.displayed(id)?;
        Ok(OfferSnapshot {
            bundle: self.bundle(offer.bundle)?.clone(),
            offer: offer.clone(),
        })
    }

    pub fn defined_snapshot(&self, id: DefinedOfferId) -> Result<OfferSnapshot<DefinedOffer>> {
        let offer = self.defined(id)?;
        Ok(OfferSnapshot {
            bundle: self.bundle(offer.bundle)?.clone(),
            offer: offer.clone(),
        })
    }

    #[must_use]
    pub fn displayed_count(&self) -> usize {
        self.displayed.len()
    }

    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.defined.len()
    }

    /// Whether the offer exists and is still available.
    #[must_use]
    pub fn is_available(&self, offer: OfferRef) -> bool {
        self.record(offer).is_ok_and(|record| record.is_available())
    }

    /// Bundles of every offer still available, i.e. everything custody
    /// should be holding.
    pub fn active_bundles(&self) -> impl Iterator<Item = (OfferRef, &Bundle)> + '_ {
        let displayed = self
            .displayed
            .iter()
            .filter(|o| o.available)
            .map(|o| (o.offer_ref(), o.bundle));
        let defined = self
            .defined
            .iter()
            .filter(|o| o.available)
            .map(|o| (o.offer_ref(), o.bundle));
        displayed
            .chain(defined)
            .filter_map(|(offer, handle)| self.bundles.get(handle).map(|b| (offer, b)))
    }

    // -----------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------

    /// Deposit `bundle` from `maker` into custody and record a displayed offer.
    ///
    /// # Errors
    /// `Unauthorized` if `maker` is the custodian; otherwise any deposit failure (`UnsupportedAsset`, `TransferFailed`,
    /// `RollbackFailed`); no record is created in that case.
    pub fn create_displayed_offer(
        &mut self,
        adapter: &mut AssetTransferAdapter,
        maker: AccountId,
        name: &str,
        bundle: &Bundle,
    ) -> Result<DisplayedOfferId> {
        ensure_not_custodian(adapter, maker)?;
        adapter.transfer_bundle(maker, adapter.operator(), bundle)?;

        let id = DisplayedOfferId(self.displayed.len() as u64);
        let handle = self.bundles.save(bundle);
        self.displayed.push(DisplayedOffer {
            id,
            name: name.to_string(),
            maker,
            bundle: handle,
            available: true,
        });

        tracing::info!(
            offer = %id,
            maker = %maker,
            entries = bundle.len(),
            "Displayed offer created"
        );
        Ok(id)
    }

    /// Deposit `bundle` from `maker` and record a counter-offer against
    /// `displayed_offer_id`.
    ///
    /// The referenced listing only has to exist; it may already be
    /// inactive, and its maker may be `maker`.
    ///
    /// # Errors
    /// - `InvalidReference` if `displayed_offer_id` is out of bounds
    /// - `Unauthorized` if `maker` is the custodian
    /// - any deposit failure; no record is created in that case
    pub fn create_defined_offer(
        &mut self,
        adapter: &mut AssetTransferAdapter,
        maker: AccountId,
        name: &str,
        displayed_offer_id: DisplayedOfferId,
        bundle: &Bundle,
    ) -> Result<DefinedOfferId> {
        if self.displayed(displayed_offer_id).is_err() {
            return Err(SwapError::InvalidReference(displayed_offer_id));
        }
        ensure_not_custodian(adapter, maker)?;

        adapter.transfer_bundle(maker, adapter.operator(), bundle)?;

        let id = DefinedOfferId(self.defined.len() as u64);
        let handle = self.bundles.save(bundle);
        self.defined.push(DefinedOffer {
            id,
            name: name.to_string(),
            maker,
            displayed_offer_id,
            bundle: handle,
            available: true,
        });

        tracing::info!(
            offer = %id,
            displayed = %displayed_offer_id,
            maker = %maker,
            entries = bundle.len(),
            "Defined offer created"
        );
        Ok(id)
    }

    // -----------------------------------------------------------------
    // Cancellation
    // -----------------------------------------------------------------

    /// Run the cancellation checks without changing anything.
    ///
    /// Returns the maker and bundle to refund.
    ///
    /// # Errors
    /// `OutOfRange`, then `Unauthorized`, then `AlreadyInactive`.
    pub fn validate_cancel(&self, offer: OfferRef, caller: AccountId) -> Result<(AccountId, BundleHandle)> {
        let record = self.record(offer)?;
        record.ensure_maker(caller)?;
        record.ensure_available()?;
        Ok((record.maker(), record.bundle()))
    }

    /// Cancel `offer` and refund its bundle from custody to the maker.
    ///
    /// # Errors
    /// - `OutOfRange`, `Unauthorized`, `AlreadyInactive` before any change
    /// - refund failures or observer rejections, after which the offer is
    ///   available again and custody unchanged
    /// - `RollbackFailed`, after which the offer stays inactive
    pub fn cancel(
        &mut self,
        adapter: &mut AssetTransferAdapter,
        offer: OfferRef,
        caller: AccountId,
        observer: &mut dyn SettlementObserver,
    ) -> Result<()> {
        let (maker, handle) = match self.validate_cancel(offer, caller) {
            Ok(found) => found,
            Err(err) => {
                if matches!(err, SwapError::Unauthorized { .. }) {
                    tracing::warn!(offer = %offer, caller = %caller, "Cancel by non-maker rejected");
                }
                return Err(err);
            }
        };

        let retired = self.retire(&[offer])?;

        let custodian = adapter.operator();
        let view: &Self = self;
        let refund = view.bundle(handle).and_then(|bundle| {
            adapter.transfer_bundle_with(custodian, maker, bundle, &mut |leg: &TransferLeg| {
                observer.on_transfer(leg, view)
            })
        });

        match refund {
            Ok(()) => {
                retired.commit();
                tracing::info!(offer = %offer, maker = %maker, "Offer cancelled and refunded");
                Ok(())
            }
            Err(err @ SwapError::RollbackFailed { .. }) => {
                retired.commit();
                tracing::error!(offer = %offer, error = %err, "Refund left custody inconsistent");
                Err(err)
            }
            Err(err) => {
                retired.rollback(self);
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------
    // Acceptance
    // -----------------------------------------------------------------

    /// Run the acceptance checks without changing anything.
    ///
    /// # Errors
    /// In order: `OutOfRange` (displayed), `Unauthorized`,
    /// `AlreadyInactive` (displayed), `OutOfRange` (defined),
    /// `AlreadyInactive` (defined), `MismatchedReference`.
    pub fn validate_accept(
        &self,
        displayed_id: DisplayedOfferId,
        defined_id: DefinedOfferId,
        caller: AccountId,
    ) -> Result<AcceptPlan> {
        let displayed = self.displayed(displayed_id)?;
        displayed.ensure_maker(caller)?;
        displayed.ensure_available()?;

        let defined = self.defined(defined_id)?;
        defined.ensure_available()?;
        if defined.displayed_offer_id != displayed_id {
            return Err(SwapError::MismatchedReference {
                displayed: displayed_id,
                defined: defined_id,
                referenced: defined.displayed_offer_id,
            });
        }

        Ok(AcceptPlan {
            displayed_id,
            defined_id,
            displayed_maker: displayed.maker,
            defined_maker: defined.maker,
            displayed_bundle: displayed.bundle,
            defined_bundle: defined.bundle,
        })
    }

    /// Flip both offers of an accepted pair to inactive, displayed first.
    ///
    /// # Errors
    /// `OutOfRange` / `AlreadyInactive`; nothing is flipped in that case.
    pub fn retire_pair(&mut self, plan: &AcceptPlan) -> Result<Retired> {
        self.retire(&[
            OfferRef::Displayed(plan.displayed_id),
            OfferRef::Defined(plan.defined_id),
        ])
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn record(&self, offer: OfferRef) -> Result<&dyn OfferRecord> {
        match offer {
            OfferRef::Displayed(id) => Ok(self.displayed(id)?),
            OfferRef::Defined(id) => Ok(self.defined(id)?),
        }
    }

    fn record_mut(&mut self, offer: OfferRef) -> Result<&mut dyn OfferRecord> {
        let idx = |raw: u64| usize::try_from(raw).unwrap_or(usize::MAX);
        let record: Option<&mut dyn OfferRecord> = match offer {
            OfferRef::Displayed(id) => self
                .displayed
                .get_mut(idx(id.0))
                .map(|o| o as &mut dyn OfferRecord),
            OfferRef::Defined(id) => self
                .defined
                .get_mut(idx(id.0))
                .map(|o| o as &mut dyn OfferRecord),
        };
        record.ok_or(SwapError::OutOfRange(offer))
    }

    /// Retire every offer in `offers`, or none of them.
    fn retire(&mut self, offers: &[OfferRef]) -> Result<Retired> {
        for offer in offers {
            self.record(*offer)?.ensure_available()?;
        }
        for offer in offers {
            self.record_mut(*offer)?.retire()?;
        }
        Ok(Retired {
            offers: offers.to_vec(),
        })
    }

    fn set_available(&mut self, offer: OfferRef, available: bool) {
        if let Ok(record) = self.record_mut(offer) {
            record.set_available(available);
        }
    }
}

/// The custodian never makes offers; its deposits would move nothing.
fn ensure_not_custodian(adapter: &AssetTransferAdapter, maker: AccountId) -> Result<()> {
    if maker == adapter.operator() {
        tracing::warn!(maker = %maker, "Offer by custodian rejected");
        return Err(SwapError::Unauthorized {
            caller: maker,
            maker,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundleswap_assets::{FungibleToken, SingleOwnerToken};
    use bundleswap_types::{ContractAddress, TokenId};
    use rust_decimal::Decimal;

    const NFT: u8 = 0x10;
    const COIN: u8 = 0x30;

    fn desk() -> AccountId {
        AccountId::fixed(0xd0)
    }
    fn alice() -> AccountId {
        AccountId::fixed(0xa1)
    }
    fn bob() -> AccountId {
        AccountId::fixed(0xb0)
    }

    fn setup() -> (OfferLedger, AssetTransferAdapter) {
        let mut nft = SingleOwnerToken::new(ContractAddress::fixed(NFT));
        nft.mint(alice(), TokenId(7)).unwrap();
        nft.set_approval_for_all(alice(), desk(), true);
        nft.set_approval_for_all(bob(), desk(), true);

        let mut coin = FungibleToken::new(ContractAddress::fixed(COIN));
        coin.mint(bob(), Decimal::new(1000, 0));
        coin.approve(bob(), desk(), Decimal::new(1000, 0));

        let mut adapter = AssetTransferAdapter::new(desk());
        adapter.register(ContractAddress::fixed(NFT), Box::new(nft));
        adapter.register(ContractAddress::fixed(COIN), Box::new(coin));
        (OfferLedger::new(), adapter)
    }

    fn nft_bundle() -> Bundle {
        Bundle::default().with_asset(ContractAddress::fixed(NFT), TokenId(7))
    }

    fn coin_bundle(amount: i64) -> Bundle {
        Bundle::default().with_fungible(ContractAddress::fixed(COIN), Decimal::new(amount, 0))
    }

    fn nft_owner(adapter: &AssetTransferAdapter) -> Option<AccountId> {
        adapter
            .owner_of(ContractAddress::fixed(NFT), TokenId(7))
            .unwrap()
    }

    /// Records what it saw; optionally rejects the n-th leg.
    struct Recorder {
        seen: Vec<(TransferLeg, bool)>,
        watch: OfferRef,
        reject_at: Option<usize>,
    }

    impl SettlementObserver for Recorder {
        fn on_transfer(&mut self, leg: &TransferLeg, offers: &OfferLedger) -> Result<()> {
            self.seen.push((*leg, offers.is_available(self.watch)));
            if self.reject_at == Some(self.seen.len()) {
                return Err(SwapError::Internal("receiver refused".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn create_displayed_deposits_and_records() {
        let (mut ledger, mut adapter) = setup();
        let id = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();

        assert_eq!(id, DisplayedOfferId(0));
        assert_eq!(nft_owner(&adapter), Some(desk()));
        let snap = ledger.displayed_snapshot(id).unwrap();
        assert_eq!(snap.offer.maker, alice());
        assert_eq!(snap.offer.name, "art");
        assert!(snap.offer.available);
        assert_eq!(snap.bundle, nft_bundle());
    }

    #[test]
    fn failed_deposit_creates_no_record() {
        let (mut ledger, mut adapter) = setup();
        // Bob does not own the NFT.
        let err = ledger
            .create_displayed_offer(&mut adapter, bob(), "stolen", &nft_bundle())
            .unwrap_err();
        assert!(matches!(err, SwapError::TransferFailed { .. }));
        assert_eq!(ledger.displayed_count(), 0);
        assert_eq!(nft_owner(&adapter), Some(alice()));
    }

    #[test]
    fn custodian_cannot_make_offers() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();

        // X#7 now sits in custody on Alice's behalf.
        let err = ledger
            .create_displayed_offer(&mut adapter, desk(), "relist", &nft_bundle())
            .unwrap_err();
        assert!(matches!(err, SwapError::Unauthorized { .. }), "Got: {err}");
        let err = ledger
            .create_defined_offer(&mut adapter, desk(), "bid", d, &nft_bundle())
            .unwrap_err();
        assert!(matches!(err, SwapError::Unauthorized { .. }), "Got: {err}");

        assert_eq!(ledger.displayed_count(), 1);
        assert_eq!(ledger.defined_count(), 0);
        assert_eq!(nft_owner(&adapter), Some(desk()));
    }

    #[test]
    fn defined_offer_needs_existing_listing() {
        let (mut ledger, mut adapter) = setup();
        let err = ledger
            .create_defined_offer(&mut adapter, bob(), "bid", DisplayedOfferId(0), &coin_bundle(100))
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidReference(DisplayedOfferId(0))));
        assert_eq!(ledger.defined_count(), 0);
        assert_eq!(
            adapter
                .fungible_balance(ContractAddress::fixed(COIN), bob())
                .unwrap(),
            Decimal::new(1000, 0)
        );
    }

    #[test]
    fn defined_offer_against_inactive_listing_allowed() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        ledger
            .cancel(&mut adapter, d.into(), alice(), &mut NoopObserver)
            .unwrap();

        let f = ledger
            .create_defined_offer(&mut adapter, bob(), "late bid", d, &coin_bundle(10))
            .unwrap();
        assert_eq!(ledger.defined(f).unwrap().displayed_offer_id, d);
        assert!(ledger.defined(f).unwrap().available);
    }

    #[test]
    fn cancel_refunds_exact_bundle() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        ledger
            .cancel(&mut adapter, d.into(), alice(), &mut NoopObserver)
            .unwrap();

        assert_eq!(nft_owner(&adapter), Some(alice()));
        assert!(!ledger.displayed(d).unwrap().available);
    }

    #[test]
    fn cancel_checks_in_order() {
        let (mut ledger, mut adapter) = setup();
        let err = ledger
            .cancel(&mut adapter, DisplayedOfferId(0).into(), alice(), &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, SwapError::OutOfRange(_)));

        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        let err = ledger
            .cancel(&mut adapter, d.into(), bob(), &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, SwapError::Unauthorized { .. }));
        assert!(ledger.displayed(d).unwrap().available);

        ledger
            .cancel(&mut adapter, d.into(), alice(), &mut NoopObserver)
            .unwrap();
        let err = ledger
            .cancel(&mut adapter, d.into(), alice(), &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, SwapError::AlreadyInactive(_)));
    }

    #[test]
    fn refund_observer_sees_offer_already_inactive() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        let mut recorder = Recorder {
            seen: Vec::new(),
            watch: d.into(),
            reject_at: None,
        };
        ledger
            .cancel(&mut adapter, d.into(), alice(), &mut recorder)
            .unwrap();
        assert_eq!(recorder.seen.len(), 1);
        assert!(!recorder.seen[0].1, "flag must be flipped before the refund");
    }

    #[test]
    fn rejected_refund_rolls_back() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        let mut recorder = Recorder {
            seen: Vec::new(),
            watch: d.into(),
            reject_at: Some(1),
        };
        let err = ledger
            .cancel(&mut adapter, d.into(), alice(), &mut recorder)
            .unwrap_err();
        assert!(matches!(err, SwapError::Internal(_)));
        assert!(ledger.displayed(d).unwrap().available);
        assert_eq!(nft_owner(&adapter), Some(desk()));
    }

    #[test]
    fn validate_accept_order() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        let f = ledger
            .create_defined_offer(&mut adapter, bob(), "bid", d, &coin_bundle(100))
            .unwrap();

        assert!(matches!(
            ledger.validate_accept(DisplayedOfferId(5), f, alice()),
            Err(SwapError::OutOfRange(OfferRef::Displayed(_)))
        ));
        assert!(matches!(
            ledger.validate_accept(d, f, bob()),
            Err(SwapError::Unauthorized { .. })
        ));
        assert!(matches!(
            ledger.validate_accept(d, DefinedOfferId(3), alice()),
            Err(SwapError::OutOfRange(OfferRef::Defined(_)))
        ));

        let plan = ledger.validate_accept(d, f, alice()).unwrap();
        assert_eq!(plan.displayed_maker, alice());
        assert_eq!(plan.defined_maker, bob());
    }

    #[test]
    fn retire_pair_then_rollback() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        let f = ledger
            .create_defined_offer(&mut adapter, bob(), "bid", d, &coin_bundle(100))
            .unwrap();
        let plan = ledger.validate_accept(d, f, alice()).unwrap();

        let retired = ledger.retire_pair(&plan).unwrap();
        assert_eq!(retired.offers().len(), 2);
        assert!(!ledger.is_available(d.into()));
        assert!(!ledger.is_available(f.into()));
        assert!(matches!(
            ledger.validate_accept(d, f, alice()),
            Err(SwapError::AlreadyInactive(_))
        ));

        retired.rollback(&mut ledger);
        assert!(ledger.is_available(d.into()));
        assert!(ledger.is_available(f.into()));
    }

    #[test]
    fn retire_is_all_or_nothing() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        let f = ledger
            .create_defined_offer(&mut adapter, bob(), "bid", d, &coin_bundle(100))
            .unwrap();
        ledger
            .cancel(&mut adapter, f.into(), bob(), &mut NoopObserver)
            .unwrap();

        let plan = AcceptPlan {
            displayed_id: d,
            defined_id: f,
            displayed_maker: alice(),
            defined_maker: bob(),
            displayed_bundle: BundleHandle(0),
            defined_bundle: BundleHandle(1),
        };
        let err = ledger.retire_pair(&plan).unwrap_err();
        assert!(matches!(err, SwapError::AlreadyInactive(OfferRef::Defined(_))));
        assert!(ledger.is_available(d.into()), "displayed must not be flipped alone");
    }

    #[test]
    fn active_bundles_tracks_custody() {
        let (mut ledger, mut adapter) = setup();
        let d = ledger
            .create_displayed_offer(&mut adapter, alice(), "art", &nft_bundle())
            .unwrap();
        ledger
            .create_defined_offer(&mut adapter, bob(), "bid", d, &coin_bundle(100))
            .unwrap();
        assert_eq!(ledger.active_bundles().count(), 2);

        ledger
            .cancel(&mut adapter, d.into(), alice(), &mut NoopObserver)
            .unwrap();
        let active: Vec<_> = ledger.active_bundles().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, OfferRef::Defined(DefinedOfferId(0)));
    }
}
