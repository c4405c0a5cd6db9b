//! Background chain worker
//!
//! Provider calls run on a dedicated thread consuming a job queue, so the
//! interface thread never blocks on the network. Results come back as
//! [`ChainSignal`] values over a channel and are folded into the store by
//! the controller. Jobs run one at a time; the two refresh fetches are
//! separate jobs so a failure in one cannot abort the other.

use crate::app::state::ActionKind;
use crate::chain::contracts::{CollateralNft, LendingDesk, LoanToken};
use crate::chain::provider::{ChainProvider, ExecutionContext, ProviderError};
use crate::config::ContractAddresses;
use crate::domain::loan::LoanRecord;
use crate::domain::primitives::{Address, TokenId, Wei};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;
use thiserror::Error;

/// Failure of a user-triggered submission sequence
///
/// Each variant names the step that failed; a granted approval followed by
/// a failed second step is reported as the second step only, since the
/// approval needs no compensation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("collateral approval failed: {0}")]
    CollateralApproval(ProviderError),

    #[error("loan creation failed: {0}")]
    Creation(ProviderError),

    #[error("loan token approval failed: {0}")]
    SpendApproval(ProviderError),

    #[error("repayment failed: {0}")]
    Repayment(ProviderError),
}

/// Work items accepted by the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainJob {
    Connect,
    FetchAssets {
        generation: u64,
        owner: Address,
    },
    FetchLoan {
        generation: u64,
        owner: Address,
    },
    CreateLoan {
        ctx: ExecutionContext,
        collateral_id: TokenId,
        amount: Wei,
    },
    RepayLoan {
        ctx: ExecutionContext,
        principal: Wei,
    },
    Shutdown,
}

/// Completed work, delivered back to the interface thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSignal {
    Connected(Result<ExecutionContext, ProviderError>),
    AssetsFetched {
        generation: u64,
        result: Result<Vec<TokenId>, ProviderError>,
    },
    LoanFetched {
        generation: u64,
        result: Result<LoanRecord, ProviderError>,
    },
    ActionFinished {
        action: ActionKind,
        result: Result<(), ActionError>,
    },
}

/// Handle to the worker thread; shuts the thread down on drop
pub struct ChainWorker {
    jobs: Sender<ChainJob>,
    handle: Option<JoinHandle<()>>,
}

impl ChainWorker {
    /// Spawns the worker thread
    pub fn spawn(
        provider: Arc<dyn ChainProvider>,
        contracts: ContractAddresses,
        signals: Sender<ChainSignal>,
    ) -> Self {
        let (jobs, job_queue) = channel();
        let handle = std::thread::spawn(move || run(provider, contracts, job_queue, signals));
        Self {
            jobs,
            handle: Some(handle),
        }
    }

    /// Queues a job; returns false if the worker has already stopped
    pub fn enqueue(&self, job: ChainJob) -> bool {
        self.jobs.send(job).is_ok()
    }
}

impl Drop for ChainWorker {
    fn drop(&mut self) {
        let _ = self.jobs.send(ChainJob::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    provider: Arc<dyn ChainProvider>,
    contracts: ContractAddresses,
    jobs: Receiver<ChainJob>,
    signals: Sender<ChainSignal>,
) {
    while let Ok(job) = jobs.recv() {
        let signal = match job {
            ChainJob::Shutdown => break,
            ChainJob::Connect => ChainSignal::Connected(provider.request_accounts()),
            ChainJob::FetchAssets { generation, owner } => {
                let nft = CollateralNft::new(provider.as_ref(), contracts.collateral_nft);
                ChainSignal::AssetsFetched {
                    generation,
                    result: nft.owned_tokens(owner),
                }
            }
            ChainJob::FetchLoan { generation, owner } => {
                let desk = LendingDesk::new(provider.as_ref(), contracts.lending_desk);
                ChainSignal::LoanFetched {
                    generation,
                    result: desk.loan_details(owner).map(LoanRecord::from_raw),
                }
            }
            ChainJob::CreateLoan {
                ctx,
                collateral_id,
                amount,
            } => ChainSignal::ActionFinished {
                action: ActionKind::CreateLoan,
                result: submit_create(provider.as_ref(), &contracts, &ctx, collateral_id, amount),
            },
            ChainJob::RepayLoan { ctx, principal } => ChainSignal::ActionFinished {
                action: ActionKind::RepayLoan,
                result: submit_repay(provider.as_ref(), &contracts, &ctx, principal),
            },
        };

        if signals.send(signal).is_err() {
            break;
        }
    }
}

/// Approval first, then creation; success only after creation confirms
fn submit_create(
    provider: &dyn ChainProvider,
    contracts: &ContractAddresses,
    ctx: &ExecutionContext,
    collateral_id: TokenId,
    amount: Wei,
) -> Result<(), ActionError> {
    let nft = CollateralNft::new(provider, contracts.collateral_nft);
    nft.approve(ctx, contracts.lending_desk, collateral_id)
        .map_err(ActionError::CollateralApproval)?;

    let desk = LendingDesk::new(provider, contracts.lending_desk);
    desk.create_loan(ctx, contracts.collateral_nft, collateral_id, amount)
        .map_err(ActionError::Creation)
}

/// Token approval for the outstanding principal, then repay
///
/// Aborts on the first failure. An approval that succeeded before a failed
/// repay stays granted; the retry path simply runs the sequence again.
fn submit_repay(
    provider: &dyn ChainProvider,
    contracts: &ContractAddresses,
    ctx: &ExecutionContext,
    principal: Wei,
) -> Result<(), ActionError> {
    let token = LoanToken::new(provider, contracts.loan_token);
    token
        .approve(ctx, contracts.lending_desk, principal)
        .map_err(ActionError::SpendApproval)?;

    let desk = LendingDesk::new(provider, contracts.lending_desk);
    desk.repay_loan(ctx).map_err(ActionError::Repayment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::sim::{SimCall, SimOp, SimulatedChain};
    use crate::domain::primitives::Address;
    use std::time::Duration;

    const ALICE: Address = Address::from_bytes([0xaa; 20]);

    fn worker_fixture(ids: &[u64]) -> (Arc<SimulatedChain>, ChainWorker, Receiver<ChainSignal>) {
        let sim = Arc::new(SimulatedChain::new(ALICE));
        sim.seed_collateral(ALICE, ids);
        let (signals, signal_queue) = channel();
        let worker = ChainWorker::spawn(
            Arc::clone(&sim) as Arc<dyn ChainProvider>,
            ContractAddresses::default(),
            signals,
        );
        (sim, worker, signal_queue)
    }

    fn next_signal(queue: &Receiver<ChainSignal>) -> ChainSignal {
        queue.recv_timeout(Duration::from_secs(5)).expect("worker signal")
    }

    fn connect(worker: &ChainWorker, queue: &Receiver<ChainSignal>) -> ExecutionContext {
        assert!(worker.enqueue(ChainJob::Connect));
        match next_signal(queue) {
            ChainSignal::Connected(Ok(ctx)) => ctx,
            other => panic!("unexpected signal: {:?}", other),
        }
    }

    #[test]
    fn connect_then_fetch_round_trip() {
        let (_sim, worker, queue) = worker_fixture(&[5, 9]);
        let ctx = connect(&worker, &queue);
        assert_eq!(ctx.account(), ALICE);

        worker.enqueue(ChainJob::FetchAssets {
            generation: 1,
            owner: ctx.account(),
        });
        match next_signal(&queue) {
            ChainSignal::AssetsFetched {
                generation: 1,
                result: Ok(ids),
            } => assert_eq!(ids, vec![TokenId(5), TokenId(9)]),
            other => panic!("unexpected signal: {:?}", other),
        }

        worker.enqueue(ChainJob::FetchLoan {
            generation: 1,
            owner: ctx.account(),
        });
        match next_signal(&queue) {
            ChainSignal::LoanFetched {
                generation: 1,
                result: Ok(record),
            } => assert!(record.has_never_borrowed()),
            other => panic!("unexpected signal: {:?}", other),
        }
    }

    #[test]
    fn create_submits_approval_then_creation() {
        let (sim, worker, queue) = worker_fixture(&[7]);
        let ctx = connect(&worker, &queue);
        sim.clear_journal();

        worker.enqueue(ChainJob::CreateLoan {
            ctx,
            collateral_id: TokenId(7),
            amount: Wei(500),
        });
        match next_signal(&queue) {
            ChainSignal::ActionFinished {
                action: ActionKind::CreateLoan,
                result: Ok(()),
            } => {}
            other => panic!("unexpected signal: {:?}", other),
        }

        let contracts = ContractAddresses::default();
        assert_eq!(
            sim.journal(),
            vec![
                SimCall::ApproveCollateral {
                    spender: contracts.lending_desk,
                    id: TokenId(7),
                },
                SimCall::CreateLoan {
                    collateral: contracts.collateral_nft,
                    id: TokenId(7),
                    amount: Wei(500),
                },
            ]
        );
        assert!(sim.loan_of(ALICE).unwrap().start_time > 0);
    }

    #[test]
    fn failed_creation_reports_creation_step() {
        let (sim, worker, queue) = worker_fixture(&[7]);
        let ctx = connect(&worker, &queue);
        sim.fail_on(SimOp::CreateLoan, ProviderError::CallReverted("paused".into()));

        worker.enqueue(ChainJob::CreateLoan {
            ctx,
            collateral_id: TokenId(7),
            amount: Wei(500),
        });
        match next_signal(&queue) {
            ChainSignal::ActionFinished {
                action: ActionKind::CreateLoan,
                result: Err(ActionError::Creation(_)),
            } => {}
            other => panic!("unexpected signal: {:?}", other),
        }
        assert!(sim.loan_of(ALICE).is_none());
    }

    #[test]
    fn repay_failure_keeps_approval_and_retry_repeats_sequence() {
        let (sim, worker, queue) = worker_fixture(&[7]);
        let ctx = connect(&worker, &queue);

        worker.enqueue(ChainJob::CreateLoan {
            ctx: ctx.clone(),
            collateral_id: TokenId(7),
            amount: Wei(500),
        });
        next_signal(&queue);

        sim.fail_on(SimOp::RepayLoan, ProviderError::Transport("node down".into()));
        sim.clear_journal();
        worker.enqueue(ChainJob::RepayLoan {
            ctx: ctx.clone(),
            principal: Wei(500),
        });
        match next_signal(&queue) {
            ChainSignal::ActionFinished {
                action: ActionKind::RepayLoan,
                result: Err(ActionError::Repayment(_)),
            } => {}
            other => panic!("unexpected signal: {:?}", other),
        }

        // Approval went through and persists across the failed repay.
        let contracts = ContractAddresses::default();
        assert_eq!(sim.allowance(ALICE, contracts.lending_desk), Wei(500));
        assert!(!sim.loan_of(ALICE).unwrap().is_repaid);

        sim.clear_failure(SimOp::RepayLoan);
        sim.clear_journal();
        worker.enqueue(ChainJob::RepayLoan {
            ctx,
            principal: Wei(500),
        });
        match next_signal(&queue) {
            ChainSignal::ActionFinished {
                action: ActionKind::RepayLoan,
                result: Ok(()),
            } => {}
            other => panic!("unexpected signal: {:?}", other),
        }
        assert_eq!(
            sim.journal(),
            vec![
                SimCall::ApproveSpend {
                    spender: contracts.lending_desk,
                    amount: Wei(500),
                },
                SimCall::RepayLoan,
            ]
        );
        assert!(sim.loan_of(ALICE).unwrap().is_repaid);
    }
}
