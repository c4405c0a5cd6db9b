//! Dashboard state
//!
//! Defines the state the presentation layer renders and the client-side
//! precondition checks for the two loan actions. The state holds transient
//! UI data only; the authoritative loan state lives in the external
//! contract and is mirrored here through refreshes.

use crate::chain::provider::ExecutionContext;
use crate::domain::amount::parse_amount;
use crate::domain::collateral::CollateralInventory;
use crate::domain::loan::LoanRecord;
use crate::domain::primitives::Wei;
use std::collections::VecDeque;
use std::fmt;

/// Upper bound on retained diagnostic lines
pub const MAX_DIAGNOSTICS: usize = 64;

/// Connection lifecycle of the wallet-backed execution context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No context; the connection prompt is shown
    #[default]
    Disconnected,
    /// A connection request is in flight
    Connecting,
    /// Context established; the dashboard is shown
    Connected(ExecutionContext),
}

impl ConnectionState {
    pub fn context(&self) -> Option<&ExecutionContext> {
        match self {
            ConnectionState::Connected(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }
}

/// The two mutating actions a user can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateLoan,
    RepayLoan,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::CreateLoan => write!(f, "take loan"),
            ActionKind::RepayLoan => write!(f, "repay loan"),
        }
    }
}

/// In-flight background work, for the status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    pub fetching_assets: bool,
    pub fetching_loan: bool,
    pub submitting: Option<ActionKind>,
}

impl Activity {
    pub fn is_idle(&self) -> bool {
        !self.fetching_assets && !self.fetching_loan && self.submitting.is_none()
    }

    /// Status line text, or None when idle
    pub fn status_line(&self) -> Option<String> {
        if let Some(action) = self.submitting {
            return Some(format!("Submitting {}...", action));
        }
        match (self.fetching_assets, self.fetching_loan) {
            (true, true) => Some("Fetching assets and loan state...".to_string()),
            (true, false) => Some("Fetching assets...".to_string()),
            (false, true) => Some("Fetching loan state...".to_string()),
            (false, false) => None,
        }
    }
}

/// Severity of a modal notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A blocking notice the user must dismiss before continuing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub connection: ConnectionState,
    pub inventory: CollateralInventory,
    /// Mirrored loan record; None until the first successful fetch
    pub loan: Option<LoanRecord>,
    /// User-entered loan amount, parsed only at action time
    pub amount_input: String,
    pub activity: Activity,
    pub notice: Option<Notice>,
    pub diagnostics: VecDeque<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The amount input accepts keystrokes only once an asset is selected
    pub fn amount_enabled(&self) -> bool {
        self.connection.is_connected() && self.inventory.selected().is_some()
    }

    /// Parses the pending amount into base units
    pub fn pending_amount(&self) -> Result<Wei, crate::domain::amount::AmountError> {
        parse_amount(&self.amount_input)
    }

    /// True when the mirrored loan exists and is unrepaid
    pub fn has_outstanding_loan(&self) -> bool {
        self.loan.as_ref().is_some_and(|loan| loan.is_outstanding())
    }

    /// Create precondition: context, selection, positive amount, and a
    /// loan record marked repaid (which includes the no-loan sentinel)
    pub fn can_create_loan(&self) -> bool {
        self.connection.is_connected()
            && self.inventory.selected().is_some()
            && self.pending_amount().is_ok()
            && self.loan.as_ref().is_some_and(|loan| loan.is_repaid)
    }

    /// Repay precondition: context and an outstanding loan
    pub fn can_repay_loan(&self) -> bool {
        self.connection.is_connected() && self.has_outstanding_loan()
    }

    /// Appends a diagnostic line, dropping the oldest beyond the cap
    pub fn push_diagnostic(&mut self, line: impl Into<String>) {
        if self.diagnostics.len() == MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(line.into());
    }
}
