//! Wallet provider boundary
//!
//! Everything the dashboard knows about the outside world goes through the
//! [`ChainProvider`] trait: one method per external contract entry point
//! plus account access. Wallet cryptography, consensus and gas estimation
//! live behind this boundary and are deliberately opaque.
//!
//! Keeping the boundary a trait lets the same coordinator run against a
//! deterministic in-process provider in tests and the development wiring.

use crate::domain::loan::RawLoanDetails;
use crate::domain::primitives::{Address, TokenId, Wei};
use thiserror::Error;

/// Opaque handle to a signing session held by the provider
///
/// The dashboard never sees key material; holding a token minted by
/// [`ChainProvider::request_accounts`] is what "signing capability" means
/// on this side of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(&self) -> u64 {
        self.0
    }
}

/// Account address plus signing capability, minted on successful connection
///
/// Passed explicitly to every mutating operation; there is no module-level
/// provider handle to fall back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    account: Address,
    session: SessionToken,
}

impl ExecutionContext {
    pub fn new(account: Address, session: SessionToken) -> Self {
        Self { account, session }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }
}

/// Failures surfaced by the provider boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No wallet provider is installed or reachable
    #[error("no wallet provider available")]
    Unavailable,

    /// The user declined the connection request
    #[error("connection request rejected by the user")]
    UserRejected,

    /// The provider granted access but exposed no accounts
    #[error("provider exposed no accounts")]
    NoAccounts,

    /// The signing session is unknown or expired
    #[error("unknown signing session")]
    UnknownSession,

    /// The contract rejected the call
    #[error("contract call reverted: {0}")]
    CallReverted(String),

    /// The call never reached the contract
    #[error("transport failure: {0}")]
    Transport(String),
}

/// The injected wallet/contract boundary
///
/// Read methods take the target contract address explicitly; mutating
/// methods additionally take the [`ExecutionContext`] whose session
/// authorizes the submission. Implementations must be shareable across the
/// UI thread and the chain worker.
pub trait ChainProvider: Send + Sync {
    /// Requests account access and mints a signing session
    fn request_accounts(&self) -> Result<ExecutionContext, ProviderError>;

    /// `balanceOf(owner)` on an ERC-721 contract
    fn balance_of(&self, contract: Address, owner: Address) -> Result<u64, ProviderError>;

    /// `tokenOfOwnerByIndex(owner, index)` on an ERC-721 contract
    fn token_of_owner_by_index(
        &self,
        contract: Address,
        owner: Address,
        index: u64,
    ) -> Result<TokenId, ProviderError>;

    /// `approve(spender, tokenId)` on an ERC-721 contract
    fn approve_collateral(
        &self,
        ctx: &ExecutionContext,
        contract: Address,
        spender: Address,
        id: TokenId,
    ) -> Result<(), ProviderError>;

    /// `setApprovalForAll(operator, approved)` on an ERC-721 contract
    fn set_approval_for_all(
        &self,
        ctx: &ExecutionContext,
        contract: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), ProviderError>;

    /// `approve(spender, amount)` on the ERC-20 loan token
    fn approve_spend(
        &self,
        ctx: &ExecutionContext,
        contract: Address,
        spender: Address,
        amount: Wei,
    ) -> Result<bool, ProviderError>;

    /// `getLoanDetails(borrower)` on the lending contract
    fn get_loan_details(
        &self,
        contract: Address,
        borrower: Address,
    ) -> Result<RawLoanDetails, ProviderError>;

    /// `createLoan(nftAddress, nftId, amount)` on the lending contract
    fn create_loan(
        &self,
        ctx: &ExecutionContext,
        contract: Address,
        collateral_contract: Address,
        collateral_id: TokenId,
        amount: Wei,
    ) -> Result<(), ProviderError>;

    /// `repayLoan()` on the lending contract
    fn repay_loan(&self, ctx: &ExecutionContext, contract: Address) -> Result<(), ProviderError>;
}
