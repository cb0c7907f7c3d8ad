//! In-memory asset contracts.
//!
//! Reference implementations of the three collaborator interfaces, used to
//! run the escrow without a real asset host. Every mutation is atomic: it
//! either fully succeeds or leaves the contract unchanged.

use std::collections::{HashMap, HashSet};

use bundleswap_types::{AccountId, ContractAddress, Result, SwapError, TokenId};
use rust_decimal::Decimal;

use crate::contract::{
    AssetContract, FungibleAsset, InterfaceId, MultiUnitAsset, SingleOwnerAsset,
};

fn refused(contract: ContractAddress, reason: String) -> SwapError {
    SwapError::TransferFailed { contract, reason }
}

// ---------------------------------------------------------------------------
// SingleOwnerToken
// ---------------------------------------------------------------------------

/// One owner per token id, with per-token and operator-wide approvals.
pub struct SingleOwnerToken {
    address: ContractAddress,
    owners: HashMap<TokenId, AccountId>,
    /// Per-token approved account.
    approvals: HashMap<TokenId, AccountId>,
    /// (owner, operator) pairs approved for every token of the owner.
    operators: HashSet<(AccountId, AccountId)>,
}

impl SingleOwnerToken {
    #[must_use]
    pub fn new(address: ContractAddress) -> Self {
        Self {
            address,
            owners: HashMap::new(),
            approvals: HashMap::new(),
            operators: HashSet::new(),
        }
    }

    /// Create `token` owned by `owner`.
    ///
    /// # Errors
    /// Returns `TransferFailed` if the token already exists.
    pub fn mint(&mut self, owner: AccountId, token: TokenId) -> Result<()> {
        if self.owners.contains_key(&token) {
            return Err(refused(self.address, format!("token {token} already minted")));
        }
        self.owners.insert(token, owner);
        Ok(())
    }

    /// Approve `spender` for a single token. Only the owner may approve.
    ///
    /// # Errors
    /// Returns `TransferFailed` if `owner` does not own `token`.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, token: TokenId) -> Result<()> {
        if self.owners.get(&token) != Some(&owner) {
            return Err(refused(self.address, format!("{owner} does not own {token}")));
        }
        self.approvals.insert(token, spender);
        Ok(())
    }

    pub fn set_approval_for_all(&mut self, owner: AccountId, operator: AccountId, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }
}

impl SingleOwnerAsset for SingleOwnerToken {
    fn owner_of(&self, token: TokenId) -> Option<AccountId> {
        self.owners.get(&token).copied()
    }

    fn is_authorized(&self, owner: AccountId, operator: AccountId, token: TokenId) -> bool {
        owner == operator
            || self.approvals.get(&token) == Some(&operator)
            || self.operators.contains(&(owner, operator))
    }

    fn transfer_from(
        &mut self,
        operator: AccountId,
        from: AccountId,
        to: AccountId,
        token: TokenId,
    ) -> Result<()> {
        match self.owners.get(&token) {
            Some(owner) if *owner == from => {}
            Some(owner) => {
                return Err(refused(
                    self.address,
                    format!("{token} is owned by {owner}, not {from}"),
                ));
            }
            None => return Err(refused(self.address, format!("{token} does not exist"))),
        }
        if !self.is_authorized(from, operator, token) {
            return Err(refused(
                self.address,
                format!("{operator} is not authorized to move {token}"),
            ));
        }
        self.approvals.remove(&token);
        self.owners.insert(token, to);
        Ok(())
    }
}

impl AssetContract for SingleOwnerToken {
    fn supports_interface(&self, interface: InterfaceId) -> bool {
        interface == InterfaceId::SINGLE_OWNER
    }
    fn single_owner(&self) -> Option<&dyn SingleOwnerAsset> {
        Some(self)
    }
    fn single_owner_mut(&mut self) -> Option<&mut dyn SingleOwnerAsset> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// MultiUnitToken
// ---------------------------------------------------------------------------

/// Unit balances per (account, token id), operator-wide approvals only.
pub struct MultiUnitToken {
    address: ContractAddress,
    balances: HashMap<(AccountId, TokenId), u64>,
    operators: HashSet<(AccountId, AccountId)>,
}

impl MultiUnitToken {
    #[must_use]
    pub fn new(address: ContractAddress) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            operators: HashSet::new(),
        }
    }

    /// Credit `amount` units of `token` to `owner`.
    pub fn mint(&mut self, owner: AccountId, token: TokenId, amount: u64) {
        *self.balances.entry((owner, token)).or_default() += amount;
    }

    pub fn set_approval_for_all(&mut self, owner: AccountId, operator: AccountId, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }
}

impl MultiUnitAsset for MultiUnitToken {
    fn balance_of(&self, owner: AccountId, token: TokenId) -> u64 {
        self.balances.get(&(owner, token)).copied().unwrap_or(0)
    }

    fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool {
        owner == operator || self.operators.contains(&(owner, operator))
    }

    fn safe_transfer_from(
        &mut self,
        operator: AccountId,
        from: AccountId,
        to: AccountId,
        token: TokenId,
        amount: u64,
        _data: &[u8],
    ) -> Result<()> {
        if !self.is_approved_for_all(from, operator) {
            return Err(refused(
                self.address,
                format!("{operator} is not an approved operator for {from}"),
            ));
        }
        let held = self.balance_of(from, token);
        if held < amount {
            return Err(refused(
                self.address,
                format!("{from} holds {held} of {token}, needs {amount}"),
            ));
        }
        let credited = self
            .balance_of(to, token)
            .checked_add(amount)
            .ok_or_else(|| refused(self.address, format!("balance of {to} would overflow")))?;
        *self.balances.entry((from, token)).or_default() -= amount;
        if from != to {
            self.balances.insert((to, token), credited);
        } else {
            *self.balances.entry((to, token)).or_default() += amount;
        }
        Ok(())
    }
}

impl AssetContract for MultiUnitToken {
    fn supports_interface(&self, interface: InterfaceId) -> bool {
        interface == InterfaceId::MULTI_UNIT
    }
    fn multi_unit(&self) -> Option<&dyn MultiUnitAsset> {
        Some(self)
    }
    fn multi_unit_mut(&mut self) -> Option<&mut dyn MultiUnitAsset> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// FungibleToken
// ---------------------------------------------------------------------------

/// Balances per account plus (owner, spender) allowances.
///
/// A spender moving its own funds needs no allowance.
pub struct FungibleToken {
    address: ContractAddress,
    balances: HashMap<AccountId, Decimal>,
    allowances: HashMap<(AccountId, AccountId), Decimal>,
}

impl FungibleToken {
    #[must_use]
    pub fn new(address: ContractAddress) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Credit `amount` to `owner`.
    pub fn mint(&mut self, owner: AccountId, amount: Decimal) {
        *self.balances.entry(owner).or_insert(Decimal::ZERO) += amount;
    }

    /// Set (not add to) the allowance of `spender` over `owner`'s funds.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Decimal) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.balances.values().copied().sum()
    }
}

impl FungibleAsset for FungibleToken {
    fn balance_of(&self, owner: AccountId) -> Decimal {
        self.balances.get(&owner).copied().unwrap_or(Decimal::ZERO)
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> Decimal {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(refused(self.address, format!("negative amount {amount}")));
        }
        let held = self.balance_of(from);
        if held < amount {
            return Err(refused(
                self.address,
                format!("{from} holds {held}, needs {amount}"),
            ));
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| refused(self.address, format!("balance of {to} would overflow")))?;
        if spender != from {
            let allowed = self.allowance(from, spender);
            if allowed < amount {
                return Err(refused(
                    self.address,
                    format!("allowance {allowed} for {spender} below {amount}"),
                ));
            }
            self.allowances.insert((from, spender), allowed - amount);
        }
        *self.balances.entry(from).or_insert(Decimal::ZERO) -= amount;
        if from != to {
            self.balances.insert(to, credited);
        } else {
            *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        }
        Ok(())
    }
}

impl AssetContract for FungibleToken {
    fn supports_interface(&self, interface: InterfaceId) -> bool {
        interface == InterfaceId::FUNGIBLE
    }
    fn fungible(&self) -> Option<&dyn FungibleAsset> {
        Some(self)
    }
    fn fungible_mut(&mut self) -> Option<&mut dyn FungibleAsset> {
        Some(self)
    }
}
