//! Asset transfer adapter — moves whole bundles between accounts.
//!
//! The adapter is the only code that talks to asset contracts. For every
//! bundle transfer it:
//! 1. Resolves each entry to a transfer leg (probing non-fungible contracts)
//! 2. Pre-flights every leg: ownership, balances, approvals, allowances
//! 3. Executes the legs in order, notifying the caller after each one
//! 4. On any failure, unwinds the legs already executed, newest first
//!
//! The custodian account is the operator / spender of every leg.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bundleswap_types::{
    AccountId, Bundle, ContractAddress, Result, SwapError, TokenId, constants,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contract::{
    AssetContract, FungibleAsset, MultiUnitAsset, NonFungibleKind, SingleOwnerAsset, probe,
    probe_fungible,
};

/// What a single leg moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegKind {
    SingleOwner { token: TokenId },
    MultiUnit { token: TokenId },
    Fungible { amount: Decimal },
}

/// One single-entry transfer within a bundle transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub contract: ContractAddress,
    pub from: AccountId,
    pub to: AccountId,
    pub kind: LegKind,
}

impl TransferLeg {
    /// The leg that undoes this one.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..*self
        }
    }
}

/// Uniform transfer front-end over every registered asset contract.
pub struct AssetTransferAdapter {
    /// Operator / spender for every transfer (the custodian).
    operator: AccountId,
    contracts: HashMap<ContractAddress, Box<dyn AssetContract>>,
}

impl AssetTransferAdapter {
    /// Create an adapter that operates transfers as `operator`.
    #[must_use]
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            contracts: HashMap::new(),
        }
    }

    #[must_use]
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    /// Make an asset contract reachable at `address`, replacing any previous one.
    pub fn register(&mut self, address: ContractAddress, contract: Box<dyn AssetContract>) {
        self.contracts.insert(address, contract);
    }

    /// Number of registered contracts.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }

    /// # Errors
    /// Returns `UnsupportedAsset` if nothing is registered at `address`.
    pub fn contract(&self, address: ContractAddress) -> Result<&dyn AssetContract> {
        self.contracts
            .get(&address)
            .map(|contract| &**contract)
            .ok_or_else(|| unknown(address))
    }

    /// # Errors
    /// Returns `UnsupportedAsset` if nothing is registered at `address`.
    pub fn contract_mut(&mut self, address: ContractAddress) -> Result<&mut dyn AssetContract> {
        match self.contracts.get_mut(&address) {
            Some(contract) => Ok(&mut **contract),
            None => Err(unknown(address)),
        }
    }

    /// Capability probe for the contract at `address`.
    pub fn probe(&self, address: ContractAddress) -> Result<NonFungibleKind> {
        probe(address, self.contract(address)?)
    }

    // -----------------------------------------------------------------
    // Read helpers
    // -----------------------------------------------------------------

    /// Owner of a single-owner token.
    pub fn owner_of(&self, address: ContractAddress, token: TokenId) -> Result<Option<AccountId>> {
        Ok(single_owner(address, self.contract(address)?)?.owner_of(token))
    }

    /// Unit balance of a multi-unit token.
    pub fn unit_balance(
        &self,
        address: ContractAddress,
        owner: AccountId,
        token: TokenId,
    ) -> Result<u64> {
        Ok(multi_unit(address, self.contract(address)?)?.balance_of(owner, token))
    }

    /// Balance of a fungible asset.
    pub fn fungible_balance(&self, address: ContractAddress, owner: AccountId) -> Result<Decimal> {
        Ok(fungible(address, self.contract(address)?)?.balance_of(owner))
    }

    // -----------------------------------------------------------------
    // Planning and pre-flight
    // -----------------------------------------------------------------

    /// Resolve every entry of `bundle` into a transfer leg, in transfer order:
    /// non-fungible entries first, then fungible entries.
    ///
    /// # Errors
    /// Returns `UnsupportedAsset` for unknown or malformed contracts.
    pub fn plan(&self, from: AccountId, to: AccountId, bundle: &Bundle) -> Result<Vec<TransferLeg>> {
        let mut legs = Vec::with_capacity(bundle.len());
        for asset in &bundle.assets {
            let kind = match self.probe(asset.contract)? {
                NonFungibleKind::SingleOwner => LegKind::SingleOwner {
                    token: asset.token_id,
                },
                NonFungibleKind::MultiUnit => LegKind::MultiUnit {
                    token: asset.token_id,
                },
            };
            legs.push(TransferLeg {
                contract: asset.contract,
                from,
                to,
                kind,
            });
        }
        for fund in &bundle.fungibles {
            probe_fungible(fund.contract, self.contract(fund.contract)?)?;
            legs.push(TransferLeg {
                contract: fund.contract,
                from,
                to,
                kind: LegKind::Fungible {
                    amount: fund.amount,
                },
            });
        }
        Ok(legs)
    }

    /// Verify that every leg of moving `bundle` out of `from` would succeed,
    /// without moving anything.
    ///
    /// Requirements are aggregated per contract (and token), so a bundle
    /// naming the same fungible asset twice needs the sum, and the same
    /// single-owner unit twice is rejected.
    ///
    /// # Errors
    /// - `UnsupportedAsset` for unknown or malformed contracts
    /// - `InvalidBundle` if a per-contract total does not fit a `Decimal`
    /// - `TransferFailed` naming the first infeasible requirement
    pub fn preflight(&self, from: AccountId, bundle: &Bundle) -> Result<()> {
        let mut singles: BTreeSet<(ContractAddress, TokenId)> = BTreeSet::new();
        let mut units: BTreeMap<(ContractAddress, TokenId), u64> = BTreeMap::new();
        let mut funds: BTreeMap<ContractAddress, Decimal> = BTreeMap::new();

        for leg in self.plan(from, self.operator, bundle)? {
            match leg.kind {
                LegKind::SingleOwner { token } => {
                    if !singles.insert((leg.contract, token)) {
                        return Err(infeasible(leg.contract, format!("{token} listed twice")));
                    }
                }
                LegKind::MultiUnit { token } => {
                    let total = units.entry((leg.contract, token)).or_default();
                    *total = total
                        .checked_add(constants::MULTI_UNIT_LEG_AMOUNT)
                        .ok_or_else(|| overflow(leg.contract))?;
                }
                LegKind::Fungible { amount } => {
                    let total = funds.entry(leg.contract).or_insert(Decimal::ZERO);
                    *total = total
                        .checked_add(amount)
                        .ok_or_else(|| overflow(leg.contract))?;
                }
            }
        }

        for (address, token) in singles {
            let asset = single_owner(address, self.contract(address)?)?;
            match asset.owner_of(token) {
                Some(owner) if owner == from => {}
                Some(owner) => {
                    return Err(infeasible(
                        address,
                        format!("{token} is owned by {owner}, not {from}"),
                    ));
                }
                None => return Err(infeasible(address, format!("{token} does not exist"))),
            }
            if from != self.operator && !asset.is_authorized(from, self.operator, token) {
                return Err(infeasible(
                    address,
                    format!("{} is not authorized to move {token} for {from}", self.operator),
                ));
            }
        }

        for ((address, token), needed) in units {
            let asset = multi_unit(address, self.contract(address)?)?;
            let held = asset.balance_of(from, token);
            if held < needed {
                return Err(infeasible(
                    address,
                    format!("{from} holds {held} of {token}, needs {needed}"),
                ));
            }
            if from != self.operator && !asset.is_approved_for_all(from, self.operator) {
                return Err(infeasible(
                    address,
                    format!("{} is not an approved operator for {from}", self.operator),
                ));
            }
        }

        for (address, needed) in funds {
            let asset = fungible(address, self.contract(address)?)?;
            let held = asset.balance_of(from);
            if held < needed {
                return Err(infeasible(
                    address,
                    format!("{from} holds {held}, needs {needed}"),
                ));
            }
            if from != self.operator {
                let allowed = asset.allowance(from, self.operator);
                if allowed < needed {
                    return Err(infeasible(
                        address,
                        format!("allowance {allowed} for {} below {needed}", self.operator),
                    ));
                }
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------

    /// Move every entry of `bundle` from `from` to `to`, all or nothing.
    pub fn transfer_bundle(&mut self, from: AccountId, to: AccountId, bundle: &Bundle) -> Result<()> {
        self.transfer_bundle_with(from, to, bundle, &mut |_: &TransferLeg| Ok(()))
    }

    /// Like [`transfer_bundle`](Self::transfer_bundle), calling `on_leg`
    /// after every executed leg. An error from `on_leg` aborts the bundle.
    ///
    /// # Errors
    /// - `UnsupportedAsset` / `TransferFailed` from planning, pre-flight or a leg
    /// - the error returned by `on_leg`
    /// - `RollbackFailed` if an executed leg could not be undone
    pub fn transfer_bundle_with(
        &mut self,
        from: AccountId,
        to: AccountId,
        bundle: &Bundle,
        on_leg: &mut dyn FnMut(&TransferLeg) -> Result<()>,
    ) -> Result<()> {
        let legs = self.plan(from, to, bundle)?;
        self.preflight(from, bundle)?;

        let mut executed: Vec<TransferLeg> = Vec::with_capacity(legs.len());
        for leg in &legs {
            let outcome = self.execute_leg(leg).map(|()| executed.push(*leg));
            if let Err(err) = outcome.and_then(|()| on_leg(leg)) {
                tracing::warn!(
                    contract = %leg.contract,
                    from = %leg.from,
                    to = %leg.to,
                    executed = executed.len(),
                    error = %err,
                    "Bundle transfer aborted, unwinding"
                );
                self.unwind(&executed)?;
                return Err(err);
            }
        }

        tracing::debug!(
            from = %from,
            to = %to,
            legs = legs.len(),
            "Bundle transferred"
        );
        Ok(())
    }

    /// Undo `executed` legs, newest first.
    ///
    /// # Errors
    /// Returns `RollbackFailed` on the first leg that cannot be reversed.
    pub fn unwind(&mut self, executed: &[TransferLeg]) -> Result<()> {
        for leg in executed.iter().rev() {
            if let Err(err) = self.execute_leg(&leg.reversed()) {
                tracing::error!(
                    contract = %leg.contract,
                    from = %leg.from,
                    to = %leg.to,
                    error = %err,
                    "Failed to reverse transfer leg"
                );
                return Err(SwapError::RollbackFailed {
                    reason: format!("reversing leg on {}: {err}", leg.contract),
                });
            }
        }
        Ok(())
    }

    fn execute_leg(&mut self, leg: &TransferLeg) -> Result<()> {
        let operator = self.operator;
        let contract = self.contract_mut(leg.contract)?;
        match leg.kind {
            LegKind::SingleOwner { token } => contract
                .single_owner_mut()
                .ok_or_else(|| not_exposed(leg.contract, "single-owner"))?
                .transfer_from(operator, leg.from, leg.to, token)?,
            LegKind::MultiUnit { token } => contract
                .multi_unit_mut()
                .ok_or_else(|| not_exposed(leg.contract, "multi-unit"))?
                .safe_transfer_from(
                    operator,
                    leg.from,
                    leg.to,
                    token,
                    constants::MULTI_UNIT_LEG_AMOUNT,
                    &[],
                )?,
            LegKind::Fungible { amount } => contract
                .fungible_mut()
                .ok_or_else(|| not_exposed(leg.contract, "fungible"))?
                .transfer_from(operator, leg.from, leg.to, amount)?,
        }
        tracing::debug!(
            contract = %leg.contract,
            from = %leg.from,
            to = %leg.to,
            kind = ?leg.kind,
            "Leg executed"
        );
        Ok(())
    }
}

fn unknown(address: ContractAddress) -> SwapError {
    SwapError::UnsupportedAsset {
        contract: address,
        reason: "no contract registered at this address".into(),
    }
}

fn not_exposed(address: ContractAddress, interface: &str) -> SwapError {
    SwapError::UnsupportedAsset {
        contract: address,
        reason: format!("{interface} interface not exposed"),
    }
}

fn infeasible(address: ContractAddress, reason: String) -> SwapError {
    SwapError::TransferFailed {
        contract: address,
        reason,
    }
}

fn overflow(address: ContractAddress) -> SwapError {
    SwapError::InvalidBundle {
        reason: format!("total for {address} overflows"),
    }
}

fn single_owner(address: ContractAddress, contract: &dyn AssetContract) -> Result<&dyn SingleOwnerAsset> {
    contract
        .single_owner()
        .ok_or_else(|| not_exposed(address, "single-owner"))
}

fn multi_unit(address: ContractAddress, contract: &dyn AssetContract) -> Result<&dyn MultiUnitAsset> {
    contract
        .multi_unit()
        .ok_or_else(|| not_exposed(address, "multi-unit"))
}

fn fungible(address: ContractAddress, contract: &dyn AssetContract) -> Result<&dyn FungibleAsset> {
    contract
        .fungible()
        .ok_or_else(|| not_exposed(address, "fungible"))
}
