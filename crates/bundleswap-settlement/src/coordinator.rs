//! Swap coordinator — the escrow desk's single entry point.
//!
//! ## Acceptance
//!
//! 1. Run every check against the ledger (read-only)
//! 2. Pre-flight both bundles out of custody (read-only)
//! 3. Retire both offers, displayed first
//! 4. Displayed bundle → defined maker
//! 5. Defined bundle → displayed maker
//! 6. Emit `OfferAccepted`
//!
//! A failure in steps 1–2 changes nothing. A failure in 4–5 unwinds every
//! executed leg, restores both flags and reports the original error. If an
//! unwind itself fails the offers stay retired and `RollbackFailed` is
//! reported.

use bundleswap_assets::{AssetContract, AssetTransferAdapter, TransferLeg};
use bundleswap_ledger::{AcceptPlan, EventLog, OfferLedger, SettlementObserver};
use bundleswap_types::{
    AccountId, Bundle, ContractAddress, DefinedOffer, DefinedOfferId, DeskConfig, DisplayedOffer,
    DisplayedOfferId, OfferRef, OfferSnapshot, Result, SwapError, SwapEvent, constants,
};

/// Owns the ledger, the asset adapter and the event log of one desk.
///
/// Every mutating operation takes `&mut self`, so operations never
/// interleave. Use [`SwapDesk`](crate::SwapDesk) to share a coordinator.
pub struct SwapCoordinator {
    config: DeskConfig,
    ledger: OfferLedger,
    assets: AssetTransferAdapter,
    events: EventLog,
    observers: Vec<Box<dyn SettlementObserver>>,
}

impl SwapCoordinator {
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: DeskConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            custodian = %config.custodian,
            max_bundle_entries = config.max_bundle_entries,
            "Swap coordinator started"
        );
        Ok(Self {
            assets: AssetTransferAdapter::new(config.custodian),
            config,
            ledger: OfferLedger::new(),
            events: EventLog::new(),
            observers: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    #[must_use]
    pub fn custodian(&self) -> AccountId {
        self.config.custodian
    }

    #[must_use]
    pub fn ledger(&self) -> &OfferLedger {
        &self.ledger
    }

    #[must_use]
    pub fn assets(&self) -> &AssetTransferAdapter {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetTransferAdapter {
        &mut self.assets
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Make an asset contract reachable at `address`.
    pub fn register_contract(&mut self, address: ContractAddress, contract: Box<dyn AssetContract>) {
        self.assets.register(address, contract);
        tracing::debug!(
            contract = %address,
            registered = self.assets.contract_count(),
            "Asset contract registered"
        );
    }

    /// Register an observer called after every transfer leg out of custody.
    pub fn add_observer(&mut self, observer: Box<dyn SettlementObserver>) {
        self.observers.push(observer);
    }

    // -----------------------------------------------------------------
    // Offer lifecycle
    // -----------------------------------------------------------------

    /// Deposit `bundle` and list it.
    ///
    /// # Errors
    /// - `InvalidOffer` / `InvalidBundle` for inputs over the configured limits
    /// - `Unauthorized` if `caller` is the custodian
    /// - `UnsupportedAsset` / `TransferFailed` if the deposit fails
    pub fn display_offer(&mut self, caller: AccountId, name: &str, bundle: &Bundle) -> Result<DisplayedOfferId> {
        self.check_input(name, bundle)?;
        let id = self
            .ledger
            .create_displayed_offer(&mut self.assets, caller, name, bundle)?;
        self.emit(SwapEvent::OfferDisplayed {
            id,
            maker: caller,
            name: name.to_string(),
            bundle: bundle.clone(),
        })?;
        Ok(id)
    }

    /// Deposit `bundle` as a counter-offer to `displayed_offer_id`.
    ///
    /// # Errors
    /// - `InvalidOffer` / `InvalidBundle` for inputs over the configured limits
    /// - `InvalidReference` if the listing does not exist
    /// - `Unauthorized` if `caller` is the custodian
    /// - `UnsupportedAsset` / `TransferFailed` if the deposit fails
    pub fn define_offer(
        &mut self,
        caller: AccountId,
        name: &str,
        displayed_offer_id: DisplayedOfferId,
        bundle: &Bundle,
    ) -> Result<DefinedOfferId> {
        self.check_input(name, bundle)?;
        let id = self.ledger.create_defined_offer(
            &mut self.assets,
            caller,
            name,
            displayed_offer_id,
            bundle,
        )?;
        self.emit(SwapEvent::OfferDefined {
            displayed_id: displayed_offer_id,
            defined_id: id,
            maker: caller,
            name: name.to_string(),
            bundle: bundle.clone(),
        })?;
        Ok(id)
    }

    pub fn cancel_displayed_offer(&mut self, caller: AccountId, id: DisplayedOfferId) -> Result<()> {
        self.ledger
            .cancel(&mut self.assets, id.into(), caller, &mut self.observers)?;
        self.emit(SwapEvent::DisplayedOfferCancelled { id })
    }

    pub fn cancel_defined_offer(&mut self, caller: AccountId, id: DefinedOfferId) -> Result<()> {
        self.ledger
            .cancel(&mut self.assets, id.into(), caller, &mut self.observers)?;
        self.emit(SwapEvent::DefinedOfferCancelled { id })
    }

    /// Exchange the bundles of a listing and one of its counter-offers.
    /// Only the listing's maker may accept.
    ///
    /// # Errors
    /// - `OutOfRange`, `Unauthorized`, `AlreadyInactive`,
    ///   `MismatchedReference` from the checks, with nothing changed
    /// - `UnsupportedAsset` / `TransferFailed` from the pre-flight, with
    ///   nothing changed
    /// - a leg failure or observer rejection, after a full rollback
    /// - `RollbackFailed` if the rollback itself failed
    pub fn accept_offer(
        &mut self,
        caller: AccountId,
        displayed_id: DisplayedOfferId,
        defined_id: DefinedOfferId,
    ) -> Result<()> {
        let plan = self
            .ledger
            .validate_accept(displayed_id, defined_id, caller)
            .inspect_err(|err| {
                if matches!(err, SwapError::Unauthorized { .. }) {
                    tracing::warn!(
                        displayed = %displayed_id,
                        caller = %caller,
                        "Accept by non-maker rejected"
                    );
                }
            })?;

        let displayed_bundle = self.ledger.bundle(plan.displayed_bundle)?.clone();
        let defined_bundle = self.ledger.bundle(plan.defined_bundle)?.clone();

        let mut both = displayed_bundle.clone();
        both.assets.extend(defined_bundle.assets.iter().copied());
        both.fungibles.extend(defined_bundle.fungibles.iter().copied());
        self.assets.preflight(self.config.custodian, &both)?;

        let retired = self.ledger.retire_pair(&plan)?;

        let outcome = settle(
            &mut self.assets,
            &self.ledger,
            &mut self.observers,
            &plan,
            &displayed_bundle,
            &defined_bundle,
        );

        match outcome {
            Ok(()) => {
                retired.commit();
                tracing::info!(
                    displayed = %displayed_id,
                    defined = %defined_id,
                    displayed_maker = %plan.displayed_maker,
                    defined_maker = %plan.defined_maker,
                    "Offer accepted"
                );
                self.emit(SwapEvent::OfferAccepted {
                    displayed_id,
                    defined_id,
                })
            }
            Err(err @ SwapError::RollbackFailed { .. }) => {
                retired.commit();
                tracing::error!(
                    displayed = %displayed_id,
                    defined = %defined_id,
                    error = %err,
                    "Settlement rollback failed, custody may be inconsistent"
                );
                Err(err)
            }
            Err(err) => {
                retired.rollback(&mut self.ledger);
                tracing::warn!(
                    displayed = %displayed_id,
                    defined = %defined_id,
                    error = %err,
                    "Settlement failed, rolled back"
                );
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    pub fn displayed_offer(&self, id: DisplayedOfferId) -> Result<OfferSnapshot<DisplayedOffer>> {
        self.ledger.displayed_snapshot(id)
    }

    pub fn defined_offer(&self, id: DefinedOfferId) -> Result<OfferSnapshot<DefinedOffer>> {
        self.ledger.defined_snapshot(id)
    }

    /// Check that custody holds every bundle of every available offer.
    ///
    /// # Errors
    /// `CustodyInvariantViolation` naming the first shortfall.
    pub fn verify_custody(&self) -> Result<()> {
        let mut held = Bundle::default();
        let mut offers: Vec<OfferRef> = Vec::new();
        for (offer, bundle) in self.ledger.active_bundles() {
            held.assets.extend(bundle.assets.iter().copied());
            held.fungibles.extend(bundle.fungibles.iter().copied());
            offers.push(offer);
        }

        self.assets
            .preflight(self.config.custodian, &held)
            .map_err(|err| {
                tracing::error!(
                    active_offers = offers.len(),
                    error = %err,
                    "Custody invariant violated"
                );
                SwapError::CustodyInvariantViolation {
                    reason: err.to_string(),
                }
            })
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn check_input(&self, name: &str, bundle: &Bundle) -> Result<()> {
        let len = name.chars().count();
        if len > self.config.max_name_len {
            return Err(SwapError::InvalidOffer {
                reason: format!("name is {len} characters, limit {}", self.config.max_name_len),
            });
        }
        bundle.validate(self.config.max_bundle_entries)
    }

    /// Record `event` for an operation whose effects are already applied.
    ///
    /// Appending only fails if the event cannot be serialized, which no
    /// `SwapEvent` variant does. If it ever happens the operation reports
    /// `Internal`: its effects stand but are missing from the log.
    fn emit(&mut self, event: SwapEvent) -> Result<()> {
        let label = event.label();
        self.events.append(event).map(|_| ()).map_err(|err| {
            tracing::error!(event = label, error = %err, "Failed to record event");
            SwapError::Internal(format!("{label} applied but not recorded: {err}"))
        })
    }
}

/// Run both legs of an accepted pair out of custody.
///
/// If the second bundle fails, the first one is moved back into custody.
fn settle(
    assets: &mut AssetTransferAdapter,
    ledger: &OfferLedger,
    observers: &mut dyn SettlementObserver,
    plan: &AcceptPlan,
    displayed_bundle: &Bundle,
    defined_bundle: &Bundle,
) -> Result<()> {
    let custodian = assets.operator();
    let mut notify = |leg: &TransferLeg| observers.on_transfer(leg, ledger);

    assets.transfer_bundle_with(custodian, plan.defined_maker, displayed_bundle, &mut notify)?;

    if let Err(err) =
        assets.transfer_bundle_with(custodian, plan.displayed_maker, defined_bundle, &mut notify)
    {
        let first_leg = assets
            .plan(custodian, plan.defined_maker, displayed_bundle)
            .map_err(|plan_err| SwapError::RollbackFailed {
                reason: format!("re-planning delivered bundle: {plan_err}"),
            })?;
        assets.unwind(&first_leg)?;
        return Err(err);
    }
    Ok(())
}
