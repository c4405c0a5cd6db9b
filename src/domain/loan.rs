//! Loan records and the zero-start-time sentinel
//!
//! The lending contract returns a fixed 6-tuple for every account, whether
//! or not that account ever borrowed. Absence of a loan is signalled by a
//! zero start time, which is the contract's storage default. That wire
//! convention is confined to this module: [`LoanRecord::from_raw`] is the
//! only place that compares a start time against [`LOAN_START_UNSET`], and
//! everything downstream asks the record instead.

use crate::domain::amount::format_amount;
use crate::domain::primitives::{Address, TokenId, Wei};
use chrono::DateTime;
use std::fmt;

/// Sentinel start time meaning "no loan record exists for this account"
///
/// The contract cannot distinguish an account that never borrowed from a
/// loan that literally started at the epoch; this client treats the zero
/// value strictly as absence, matching the contract's storage default.
pub const LOAN_START_UNSET: u64 = 0;

/// Raw `getLoanDetails` tuple, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLoanDetails {
    pub borrower: Address,
    pub collateral_contract: Address,
    pub collateral_id: TokenId,
    pub principal: Wei,
    pub start_time: u64,
    pub is_repaid: bool,
}

/// Reconciled per-account loan state
///
/// At most one loan exists per account; that invariant is enforced by the
/// contract, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanRecord {
    pub borrower: Address,
    pub collateral_contract: Address,
    pub collateral_id: TokenId,
    pub principal: Wei,
    pub start_time: u64,
    pub is_repaid: bool,
}

impl LoanRecord {
    /// Reconciles a raw tuple into a trusted record
    ///
    /// Sentinel precedence: when the start time is [`LOAN_START_UNSET`] the
    /// other tuple fields are untrusted and zeroed out, and the record is
    /// marked repaid so borrowing preconditions treat the account as free.
    pub fn from_raw(raw: RawLoanDetails) -> Self {
        if raw.start_time == LOAN_START_UNSET {
            return Self {
                borrower: raw.borrower,
                collateral_contract: Address::ZERO,
                collateral_id: TokenId(0),
                principal: Wei::ZERO,
                start_time: LOAN_START_UNSET,
                is_repaid: true,
            };
        }

        Self {
            borrower: raw.borrower,
            collateral_contract: raw.collateral_contract,
            collateral_id: raw.collateral_id,
            principal: raw.principal,
            start_time: raw.start_time,
            is_repaid: raw.is_repaid,
        }
    }

    /// True when no loan record exists for the account
    pub fn has_never_borrowed(&self) -> bool {
        self.start_time == LOAN_START_UNSET
    }

    /// True when a loan exists and has not been repaid
    pub fn is_outstanding(&self) -> bool {
        !self.has_never_borrowed() && !self.is_repaid
    }

    /// Lifecycle as seen by the dashboard
    pub fn status(&self) -> LoanStatus {
        if self.has_never_borrowed() {
            LoanStatus::NoLoan
        } else if self.is_repaid {
            LoanStatus::Repaid
        } else {
            LoanStatus::Active
        }
    }

    /// Principal scaled to decimal text, e.g. `"1.0"`
    pub fn principal_display(&self) -> String {
        format_amount(self.principal)
    }
}

/// Per-account loan lifecycle, inferred exclusively from fetched state
///
/// `NoLoan` and `Repaid` are equivalent for borrowing preconditions; they
/// differ only in display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    NoLoan,
    Active,
    Repaid,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::NoLoan => write!(f, "No outstanding loan"),
            LoanStatus::Active => write!(f, "Loan Active"),
            LoanStatus::Repaid => write!(f, "Loan Repaid"),
        }
    }
}

/// Formats a loan start time for the summary panel
pub fn format_start_time(start_time: u64) -> String {
    if start_time == LOAN_START_UNSET {
        return "Timestamp not available".to_string();
    }

    match DateTime::from_timestamp(start_time as i64, 0) {
        Some(moment) => moment.format("%A, %B %-d, %Y, %-I:%M:%S %p UTC").to_string(),
        None => "Invalid timestamp".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_address(fill: u8) -> Address {
        Address::from_bytes([fill; 20])
    }

    fn active_raw() -> RawLoanDetails {
        RawLoanDetails {
            borrower: some_address(0xab),
            collateral_contract: some_address(0xcd),
            collateral_id: TokenId(7),
            principal: Wei(1_000_000_000_000_000_000),
            start_time: 1_700_000_000,
            is_repaid: false,
        }
    }

    #[test]
    fn sentinel_takes_precedence_over_other_fields() {
        // Junk in every other field must not survive reconciliation.
        let raw = RawLoanDetails {
            start_time: LOAN_START_UNSET,
            ..active_raw()
        };
        let record = LoanRecord::from_raw(raw);

        assert!(record.is_repaid);
        assert!(record.has_never_borrowed());
        assert_eq!(record.collateral_id, TokenId(0));
        assert_eq!(record.collateral_contract, Address::ZERO);
        assert_eq!(record.principal, Wei::ZERO);
        assert_eq!(record.status(), LoanStatus::NoLoan);
    }

    #[test]
    fn nonzero_start_time_is_trusted() {
        let record = LoanRecord::from_raw(active_raw());

        assert!(!record.is_repaid);
        assert!(record.is_outstanding());
        assert_eq!(record.collateral_id, TokenId(7));
        assert_eq!(record.status(), LoanStatus::Active);
        assert_eq!(record.principal_display(), "1.0");
    }

    #[test]
    fn repaid_loan_is_not_outstanding() {
        let record = LoanRecord::from_raw(RawLoanDetails {
            is_repaid: true,
            ..active_raw()
        });

        assert!(!record.is_outstanding());
        assert!(!record.has_never_borrowed());
        assert_eq!(record.status(), LoanStatus::Repaid);
    }

    #[test]
    fn status_display_matches_summary_text() {
        assert_eq!(LoanStatus::NoLoan.to_string(), "No outstanding loan");
        assert_eq!(LoanStatus::Active.to_string(), "Loan Active");
        assert_eq!(LoanStatus::Repaid.to_string(), "Loan Repaid");
    }

    #[test]
    fn start_time_formatting() {
        assert_eq!(format_start_time(LOAN_START_UNSET), "Timestamp not available");

        let formatted = format_start_time(1_700_000_000);
        assert!(formatted.contains("November"));
        assert!(formatted.contains("2023"));
        assert!(formatted.ends_with("UTC"));
    }
}
