//! Application controller and coordination layer
//!
//! The controller orchestrates between input, domain, chain and UI layers.
//! It owns the three coordinator roles: connection (mint an execution
//! context), reads (generation-tagged refresh of assets and loan state)
//! and actions (precondition-checked loan submissions). All provider work
//! is delegated to the chain worker; the controller folds results back
//! into the store as they arrive.

use crate::app::state::{ActionKind, ConnectionState, Notice};
use crate::app::store::StateStore;
use crate::app::worker::{ChainJob, ChainSignal, ChainWorker};
use crate::chain::provider::ProviderError;
use crate::input::UiAction;
use std::sync::Arc;

/// Longest accepted amount entry
const MAX_AMOUNT_CHARS: usize = 32;

const MSG_INVALID_CREATE: &str =
    "Please enter a valid loan amount and select an NFT as collateral.";
const MSG_NO_PROVIDER: &str =
    "Wallet provider is not available. Please connect an account first.";
const MSG_LOAN_OUTSTANDING: &str =
    "An outstanding loan must be repaid before taking a new one.";
const MSG_LOAN_NOT_LOADED: &str = "Loan state has not loaded yet. Refresh and try again.";
const MSG_REPAY_MISSING: &str = "Cannot proceed without a provider and loan details.";
const MSG_CREATE_OK: &str = "Loan taken successfully!";
const MSG_REPAY_OK: &str = "Loan repaid successfully!";
const MSG_CREATE_FAILED: &str = "There was an error taking out the loan.";
const MSG_REPAY_FAILED: &str = "There was an error repaying the loan.";

/// Main dashboard controller
pub struct DashboardController {
    store: Arc<StateStore>,
    worker: ChainWorker,
}

impl DashboardController {
    pub fn new(store: Arc<StateStore>, worker: ChainWorker) -> Self {
        Self { store, worker }
    }

    /// Requests account access from the provider
    ///
    /// A single attempt; rejection and provider absence are recorded as
    /// diagnostics without a blocking notice, and the connection prompt
    /// stays up.
    pub fn connect(&self) {
        let idle = self
            .store
            .read(|state| matches!(state.connection, ConnectionState::Disconnected));
        if !idle {
            return;
        }

        self.store.update(|state| state.connection = ConnectionState::Connecting);
        if !self.worker.enqueue(ChainJob::Connect) {
            self.store.update(|state| {
                state.connection = ConnectionState::Disconnected;
                state.push_diagnostic("chain worker is not running");
            });
        }
    }

    /// Starts a new read cycle for the connected account
    ///
    /// Both fetches are queued independently under one generation; results
    /// from any earlier cycle will be dropped on arrival.
    pub fn refresh(&self) {
        let owner = self
            .store
            .read(|state| state.connection.context().map(|ctx| ctx.account()));
        let Some(owner) = owner else {
            return;
        };

        let generation = self.store.begin_refresh();
        let queued = self.worker.enqueue(ChainJob::FetchAssets { generation, owner })
            && self.worker.enqueue(ChainJob::FetchLoan { generation, owner });
        if !queued {
            self.store.push_diagnostic("chain worker is not running");
        }
    }

    /// Folds a completed background job into the store
    pub fn handle_signal(&self, signal: ChainSignal) {
        match signal {
            ChainSignal::Connected(Ok(ctx)) => {
                self.store.update(|state| {
                    state.push_diagnostic(format!("connected as {}", ctx.account().short()));
                    state.connection = ConnectionState::Connected(ctx);
                });
                self.refresh();
            }
            ChainSignal::Connected(Err(error)) => {
                self.store.update(|state| {
                    let line = match error {
                        ProviderError::Unavailable => {
                            "no wallet provider detected; install one to continue".to_string()
                        }
                        ProviderError::UserRejected => {
                            "connection request was rejected".to_string()
                        }
                        other => format!("error initializing provider: {}", other),
                    };
                    state.push_diagnostic(line);
                    state.connection = ConnectionState::Disconnected;
                });
            }
            ChainSignal::AssetsFetched { generation, result } => {
                self.store.apply_assets(generation, result);
            }
            ChainSignal::LoanFetched { generation, result } => {
                self.store.apply_loan(generation, result);
            }
            ChainSignal::ActionFinished { action, result } => {
                self.store.update(|state| {
                    state.activity.submitting = None;
                    match &result {
                        Ok(()) => {
                            state.notice = Some(Notice::info(match action {
                                ActionKind::CreateLoan => MSG_CREATE_OK,
                                ActionKind::RepayLoan => MSG_REPAY_OK,
                            }));
                        }
                        Err(error) => {
                            state.push_diagnostic(format!("error submitting {}: {}", action, error));
                            state.notice = Some(Notice::error(match action {
                                ActionKind::CreateLoan => MSG_CREATE_FAILED,
                                ActionKind::RepayLoan => MSG_REPAY_FAILED,
                            }));
                        }
                    }
                });
                // The authoritative state changed (or may have); re-read it
                // rather than trusting the local mirror.
                self.refresh();
            }
        }
    }

    /// Applies a user action
    ///
    /// While a notice is up it behaves as a modal dialog: only dismissal
    /// is accepted.
    pub fn handle_action(&self, action: UiAction) {
        let notice_up = self.store.read(|state| state.notice.is_some());
        if notice_up {
            if action == UiAction::Dismiss {
                self.store.update(|state| state.notice = None);
            }
            return;
        }

        match action {
            UiAction::Connect => self.connect(),
            UiAction::Refresh => self.refresh(),
            UiAction::SelectNext => self.store.update(|state| {
                if state.connection.is_connected() {
                    state.inventory.cursor_next();
                }
            }),
            UiAction::SelectPrev => self.store.update(|state| {
                if state.connection.is_connected() {
                    state.inventory.cursor_prev();
                }
            }),
            UiAction::ToggleSelect => self.store.update(|state| {
                if state.connection.is_connected() {
                    state.inventory.toggle_at_cursor();
                }
            }),
            UiAction::AmountChar(ch) => self.store.update(|state| {
                let accepts = state.amount_enabled()
                    && state.amount_input.len() < MAX_AMOUNT_CHARS
                    && (ch.is_ascii_digit() || (ch == '.' && !state.amount_input.contains('.')));
                if accepts {
                    state.amount_input.push(ch);
                }
            }),
            UiAction::AmountBackspace => self.store.update(|state| {
                if state.amount_enabled() {
                    state.amount_input.pop();
                }
            }),
            UiAction::Borrow => self.request_create_loan(),
            UiAction::Repay => self.request_repay_loan(),
            UiAction::Dismiss | UiAction::Quit => {}
        }
    }

    /// Validates create preconditions and queues the submission
    ///
    /// Violations surface a blocking notice and no job is queued, so an
    /// invalid request never reaches the network.
    fn request_create_loan(&self) {
        let snapshot = self.store.snapshot();
        if snapshot.activity.submitting.is_some() {
            return;
        }

        let (Some(collateral_id), Ok(amount)) =
            (snapshot.inventory.selected(), snapshot.pending_amount())
        else {
            self.block(MSG_INVALID_CREATE);
            return;
        };
        let Some(ctx) = snapshot.connection.context() else {
            self.block(MSG_NO_PROVIDER);
            return;
        };
        match &snapshot.loan {
            Some(loan) if loan.is_repaid => {}
            Some(_) => {
                self.block(MSG_LOAN_OUTSTANDING);
                return;
            }
            None => {
                self.block(MSG_LOAN_NOT_LOADED);
                return;
            }
        }

        self.store
            .update(|state| state.activity.submitting = Some(ActionKind::CreateLoan));
        self.worker.enqueue(ChainJob::CreateLoan {
            ctx: ctx.clone(),
            collateral_id,
            amount,
        });
    }

    /// Validates repay preconditions and queues the submission
    fn request_repay_loan(&self) {
        let snapshot = self.store.snapshot();
        if snapshot.activity.submitting.is_some() {
            return;
        }

        let Some(ctx) = snapshot.connection.context() else {
            self.block(MSG_REPAY_MISSING);
            return;
        };
        let outstanding = snapshot.loan.filter(|loan| loan.is_outstanding());
        let Some(loan) = outstanding else {
            self.block(MSG_REPAY_MISSING);
            return;
        };

        self.store
            .update(|state| state.activity.submitting = Some(ActionKind::RepayLoan));
        self.worker.enqueue(ChainJob::RepayLoan {
            ctx: ctx.clone(),
            principal: loan.principal,
        });
    }

    fn block(&self, message: &str) {
        self.store
            .update(|state| state.notice = Some(Notice::error(message)));
    }
}
