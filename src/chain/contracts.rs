//! Typed clients for the three configured contracts
//!
//! Thin wrappers that bind a contract address from configuration to the
//! provider boundary, so coordinator code reads as calls on the collateral
//! NFT, the loan token and the lending desk rather than raw entry points.

use crate::chain::provider::{ChainProvider, ExecutionContext, ProviderError};
use crate::domain::loan::RawLoanDetails;
use crate::domain::primitives::{Address, TokenId, Wei};

/// ERC-721 collateral contract client
pub struct CollateralNft<'a> {
    provider: &'a dyn ChainProvider,
    address: Address,
}

impl<'a> CollateralNft<'a> {
    pub fn new(provider: &'a dyn ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn balance_of(&self, owner: Address) -> Result<u64, ProviderError> {
        self.provider.balance_of(self.address, owner)
    }

    pub fn token_of_owner_by_index(
        &self,
        owner: Address,
        index: u64,
    ) -> Result<TokenId, ProviderError> {
        self.provider.token_of_owner_by_index(self.address, owner, index)
    }

    /// Enumerates every token the owner holds, in index order
    ///
    /// Issues one `balanceOf` call followed by exactly one indexed lookup
    /// per position.
    pub fn owned_tokens(&self, owner: Address) -> Result<Vec<TokenId>, ProviderError> {
        let balance = self.balance_of(owner)?;
        let mut ids = Vec::with_capacity(balance as usize);
        for index in 0..balance {
            ids.push(self.token_of_owner_by_index(owner, index)?);
        }
        Ok(ids)
    }

    /// Grants a spender transfer approval over one token
    pub fn approve(
        &self,
        ctx: &ExecutionContext,
        spender: Address,
        id: TokenId,
    ) -> Result<(), ProviderError> {
        self.provider.approve_collateral(ctx, self.address, spender, id)
    }

    /// Grants or revokes blanket operator approval
    pub fn set_approval_for_all(
        &self,
        ctx: &ExecutionContext,
        operator: Address,
        approved: bool,
    ) -> Result<(), ProviderError> {
        self.provider.set_approval_for_all(ctx, self.address, operator, approved)
    }
}

/// ERC-20 loan token client
pub struct LoanToken<'a> {
    provider: &'a dyn ChainProvider,
    address: Address,
}

impl<'a> LoanToken<'a> {
    pub fn new(provider: &'a dyn ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    /// Approves a spender for the given amount
    pub fn approve(
        &self,
        ctx: &ExecutionContext,
        spender: Address,
        amount: Wei,
    ) -> Result<bool, ProviderError> {
        self.provider.approve_spend(ctx, self.address, spender, amount)
    }
}

/// Lending contract client
pub struct LendingDesk<'a> {
    provider: &'a dyn ChainProvider,
    address: Address,
}

impl<'a> LendingDesk<'a> {
    pub fn new(provider: &'a dyn ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    /// Reads the raw loan tuple for a borrower
    ///
    /// Sentinel reconciliation is the read coordinator's job; the client
    /// returns the tuple as the contract shaped it.
    pub fn loan_details(&self, borrower: Address) -> Result<RawLoanDetails, ProviderError> {
        self.provider.get_loan_details(self.address, borrower)
    }

    pub fn create_loan(
        &self,
        ctx: &ExecutionContext,
        collateral_contract: Address,
        collateral_id: TokenId,
        amount: Wei,
    ) -> Result<(), ProviderError> {
        self.provider
            .create_loan(ctx, self.address, collateral_contract, collateral_id, amount)
    }

    pub fn repay_loan(&self, ctx: &ExecutionContext) -> Result<(), ProviderError> {
        self.provider.repay_loan(ctx, self.address)
    }
}
