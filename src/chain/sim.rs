//! Deterministic in-process provider
//!
//! Stands in for the injected wallet and the deployed contracts so the same
//! coordinator code runs in tests and in the development wiring. State is
//! fully scripted: seeded accounts, collateral and loans, an adjustable
//! clock, per-operation failure injection, and a call journal that tests
//! use to pin submission counts and ordering.

use crate::chain::provider::{ChainProvider, ExecutionContext, ProviderError, SessionToken};
use crate::domain::loan::{LOAN_START_UNSET, RawLoanDetails};
use crate::domain::primitives::{Address, TokenId, Wei};
use std::collections::HashMap;
use std::sync::Mutex;

/// Loan start time minted for the first simulated loan
pub const SIM_GENESIS_TIME: u64 = 1_700_000_000;

/// How the simulated wallet answers a connection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectBehavior {
    Grant,
    Reject,
    Absent,
}

/// One provider call, as recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    RequestAccounts,
    BalanceOf { owner: Address },
    TokenOfOwnerByIndex { owner: Address, index: u64 },
    ApproveCollateral { spender: Address, id: TokenId },
    SetApprovalForAll { operator: Address, approved: bool },
    ApproveSpend { spender: Address, amount: Wei },
    GetLoanDetails { borrower: Address },
    CreateLoan { collateral: Address, id: TokenId, amount: Wei },
    RepayLoan,
}

/// Operations that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimOp {
    BalanceOf,
    TokenOfOwnerByIndex,
    ApproveCollateral,
    SetApprovalForAll,
    ApproveSpend,
    GetLoanDetails,
    CreateLoan,
    RepayLoan,
}

struct SimState {
    account: Address,
    connect: ConnectBehavior,
    next_session: u64,
    sessions: HashMap<u64, Address>,
    owned: HashMap<Address, Vec<TokenId>>,
    loans: HashMap<Address, RawLoanDetails>,
    allowances: HashMap<(Address, Address), Wei>,
    collateral_approvals: HashMap<TokenId, Address>,
    journal: Vec<SimCall>,
    failures: HashMap<SimOp, ProviderError>,
    clock: u64,
}

/// Scriptable provider implementation
pub struct SimulatedChain {
    inner: Mutex<SimState>,
}

impl SimulatedChain {
    /// Creates a provider that grants connections for the given account
    pub fn new(account: Address) -> Self {
        Self {
            inner: Mutex::new(SimState {
                account,
                connect: ConnectBehavior::Grant,
                next_session: 1,
                sessions: HashMap::new(),
                owned: HashMap::new(),
                loans: HashMap::new(),
                allowances: HashMap::new(),
                collateral_approvals: HashMap::new(),
                journal: Vec::new(),
                failures: HashMap::new(),
                clock: SIM_GENESIS_TIME,
            }),
        }
    }

    /// Seeds the collateral inventory of an owner
    pub fn seed_collateral(&self, owner: Address, ids: &[u64]) {
        let mut state = self.lock();
        state.owned.insert(owner, ids.iter().copied().map(TokenId).collect());
    }

    /// Seeds a pre-existing loan record
    pub fn seed_loan(&self, raw: RawLoanDetails) {
        self.lock().loans.insert(raw.borrower, raw);
    }

    /// Makes every subsequent connection request fail as user-rejected
    pub fn reject_connections(&self) {
        self.lock().connect = ConnectBehavior::Reject;
    }

    /// Simulates an environment with no wallet provider installed
    pub fn make_unavailable(&self) {
        self.lock().connect = ConnectBehavior::Absent;
    }

    /// Scripts an operation to fail until cleared
    pub fn fail_on(&self, op: SimOp, error: ProviderError) {
        self.lock().failures.insert(op, error);
    }

    pub fn clear_failure(&self, op: SimOp) {
        self.lock().failures.remove(&op);
    }

    pub fn set_clock(&self, unix_time: u64) {
        self.lock().clock = unix_time;
    }

    /// Returns a copy of the call journal
    pub fn journal(&self) -> Vec<SimCall> {
        self.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    pub fn loan_of(&self, borrower: Address) -> Option<RawLoanDetails> {
        self.lock().loans.get(&borrower).copied()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Wei {
        self.lock().allowances.get(&(owner, spender)).copied().unwrap_or(Wei::ZERO)
    }

    pub fn owned_ids(&self, owner: Address) -> Vec<TokenId> {
        self.lock().owned.get(&owner).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.inner.lock().unwrap()
    }

    fn record_and_check(
        state: &mut SimState,
        call: SimCall,
        op: SimOp,
    ) -> Result<(), ProviderError> {
        state.journal.push(call);
        match state.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn validate_session(state: &SimState, ctx: &ExecutionContext) -> Result<(), ProviderError> {
        match state.sessions.get(&ctx.session().raw()) {
            Some(account) if *account == ctx.account() => Ok(()),
            _ => Err(ProviderError::UnknownSession),
        }
    }
}

impl ChainProvider for SimulatedChain {
    fn request_accounts(&self) -> Result<ExecutionContext, ProviderError> {
        let mut state = self.lock();
        state.journal.push(SimCall::RequestAccounts);
        match state.connect {
            ConnectBehavior::Absent => Err(ProviderError::Unavailable),
            ConnectBehavior::Reject => Err(ProviderError::UserRejected),
            ConnectBehavior::Grant => {
                let raw = state.next_session;
                state.next_session += 1;
                let account = state.account;
                state.sessions.insert(raw, account);
                Ok(ExecutionContext::new(account, SessionToken::new(raw)))
            }
        }
    }

    fn balance_of(&self, _contract: Address, owner: Address) -> Result<u64, ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(&mut state, SimCall::BalanceOf { owner }, SimOp::BalanceOf)?;
        Ok(state.owned.get(&owner).map_or(0, |ids| ids.len() as u64))
    }

    fn token_of_owner_by_index(
        &self,
        _contract: Address,
        owner: Address,
        index: u64,
    ) -> Result<TokenId, ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(
            &mut state,
            SimCall::TokenOfOwnerByIndex { owner, index },
            SimOp::TokenOfOwnerByIndex,
        )?;
        state
            .owned
            .get(&owner)
            .and_then(|ids| ids.get(index as usize).copied())
            .ok_or_else(|| ProviderError::CallReverted("owner index out of bounds".into()))
    }

    fn approve_collateral(
        &self,
        ctx: &ExecutionContext,
        _contract: Address,
        spender: Address,
        id: TokenId,
    ) -> Result<(), ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(
            &mut state,
            SimCall::ApproveCollateral { spender, id },
            SimOp::ApproveCollateral,
        )?;
        Self::validate_session(&state, ctx)?;

        let owns = state
            .owned
            .get(&ctx.account())
            .is_some_and(|ids| ids.contains(&id));
        if !owns {
            return Err(ProviderError::CallReverted(
                "approval caller does not own the token".into(),
            ));
        }
        state.collateral_approvals.insert(id, spender);
        Ok(())
    }

    fn set_approval_for_all(
        &self,
        ctx: &ExecutionContext,
        _contract: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(
            &mut state,
            SimCall::SetApprovalForAll { operator, approved },
            SimOp::SetApprovalForAll,
        )?;
        Self::validate_session(&state, ctx)?;

        let owned: Vec<TokenId> = state.owned.get(&ctx.account()).cloned().unwrap_or_default();
        for id in owned {
            if approved {
                state.collateral_approvals.insert(id, operator);
            } else {
                state.collateral_approvals.remove(&id);
            }
        }
        Ok(())
    }

    fn approve_spend(
        &self,
        ctx: &ExecutionContext,
        _contract: Address,
        spender: Address,
        amount: Wei,
    ) -> Result<bool, ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(
            &mut state,
            SimCall::ApproveSpend { spender, amount },
            SimOp::ApproveSpend,
        )?;
        Self::validate_session(&state, ctx)?;
        state.allowances.insert((ctx.account(), spender), amount);
        Ok(true)
    }

    fn get_loan_details(
        &self,
        _contract: Address,
        borrower: Address,
    ) -> Result<RawLoanDetails, ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(
            &mut state,
            SimCall::GetLoanDetails { borrower },
            SimOp::GetLoanDetails,
        )?;

        // Storage default: accounts with no record get the zero tuple.
        Ok(state.loans.get(&borrower).copied().unwrap_or(RawLoanDetails {
            borrower,
            collateral_contract: Address::ZERO,
            collateral_id: TokenId(0),
            principal: Wei::ZERO,
            start_time: LOAN_START_UNSET,
            is_repaid: false,
        }))
    }

    fn create_loan(
        &self,
        ctx: &ExecutionContext,
        contract: Address,
        collateral_contract: Address,
        collateral_id: TokenId,
        amount: Wei,
    ) -> Result<(), ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(
            &mut state,
            SimCall::CreateLoan {
                collateral: collateral_contract,
                id: collateral_id,
                amount,
            },
            SimOp::CreateLoan,
        )?;
        Self::validate_session(&state, ctx)?;

        let borrower = ctx.account();
        if state
            .loans
            .get(&borrower)
            .is_some_and(|loan| loan.start_time != LOAN_START_UNSET && !loan.is_repaid)
        {
            return Err(ProviderError::CallReverted("borrower already has an active loan".into()));
        }
        if amount.is_zero() {
            return Err(ProviderError::CallReverted("loan amount must be positive".into()));
        }

        let owns = state
            .owned
            .get(&borrower)
            .is_some_and(|ids| ids.contains(&collateral_id));
        if !owns {
            return Err(ProviderError::CallReverted("borrower does not own the collateral".into()));
        }
        if state.collateral_approvals.get(&collateral_id) != Some(&contract) {
            return Err(ProviderError::CallReverted(
                "collateral transfer not approved for the lending contract".into(),
            ));
        }

        // Escrow the collateral and open the loan.
        if let Some(ids) = state.owned.get_mut(&borrower) {
            ids.retain(|id| *id != collateral_id);
        }
        state.collateral_approvals.remove(&collateral_id);
        let start_time = state.clock;
        state.clock += 60;
        state.loans.insert(
            borrower,
            RawLoanDetails {
                borrower,
                collateral_contract,
                collateral_id,
                principal: amount,
                start_time,
                is_repaid: false,
            },
        );
        Ok(())
    }

    fn repay_loan(&self, ctx: &ExecutionContext, contract: Address) -> Result<(), ProviderError> {
        let mut state = self.lock();
        Self::record_and_check(&mut state, SimCall::RepayLoan, SimOp::RepayLoan)?;
        Self::validate_session(&state, ctx)?;

        let borrower = ctx.account();
        let Some(loan) = state.loans.get(&borrower).copied() else {
            return Err(ProviderError::CallReverted("no loan for borrower".into()));
        };
        if loan.start_time == LOAN_START_UNSET || loan.is_repaid {
            return Err(ProviderError::CallReverted("no active loan to repay".into()));
        }

        let key = (borrower, contract);
        let allowance = state.allowances.get(&key).copied().unwrap_or(Wei::ZERO);
        if allowance < loan.principal {
            return Err(ProviderError::CallReverted(
                "insufficient loan token allowance".into(),
            ));
        }
        state.allowances.insert(key, Wei(allowance.0 - loan.principal.0));

        if let Some(record) = state.loans.get_mut(&borrower) {
            record.is_repaid = true;
        }
        state.owned.entry(borrower).or_default().push(loan.collateral_id);
        Ok(())
    }
}
