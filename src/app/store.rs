//! Subscribe/notify state store
//!
//! Owns the dashboard state behind a mutex and notifies subscribers after
//! every mutation. The store also owns refresh ordering: each read cycle
//! gets a generation number, fetch results carry the generation they were
//! issued under, and results for a superseded generation are discarded so
//! a slow fetch can never overwrite newer state.

use crate::app::state::DashboardState;
use crate::chain::provider::ProviderError;
use crate::domain::loan::LoanRecord;
use crate::domain::primitives::TokenId;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback invoked after every state mutation
pub type Subscriber = Box<dyn Fn() + Send>;

/// Shared state store with change notification
pub struct StateStore {
    state: Mutex<DashboardState>,
    subscribers: Mutex<Vec<(u64, Subscriber)>>,
    next_subscriber: AtomicU64,
    generation: AtomicU64,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DashboardState::new()),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber: AtomicU64::new(1),
            generation: AtomicU64::new(0),
        }
    }

    /// Runs a closure against an immutable view of the state
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state)
    }

    /// Clones the state for rendering
    pub fn snapshot(&self) -> DashboardState {
        self.state.lock().unwrap().clone()
    }

    /// Mutates the state and notifies subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let result = {
            let mut state = self.state.lock().unwrap();
            f(&mut state)
        };
        self.notify();
        result
    }

    /// Registers a change callback and returns its handle
    pub fn subscribe(&self, subscriber: Subscriber) -> u64 {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().unwrap().push((id, subscriber));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().unwrap().retain(|(sid, _)| *sid != id);
    }

    fn notify(&self) {
        let subscribers = self.subscribers.lock().unwrap();
        for (_, subscriber) in subscribers.iter() {
            subscriber();
        }
    }

    /// Starts a new read cycle and returns its generation
    ///
    /// Any fetch results still in flight for earlier generations will be
    /// dropped on arrival.
    pub fn begin_refresh(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(|state| {
            state.activity.fetching_assets = true;
            state.activity.fetching_loan = true;
        });
        generation
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.current_generation()
    }

    /// Applies an asset fetch result; returns false if it was stale
    ///
    /// On failure the previous inventory is retained and a diagnostic is
    /// recorded; a failed fetch never blocks the loan fetch.
    pub fn apply_assets(
        &self,
        generation: u64,
        result: Result<Vec<TokenId>, ProviderError>,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.update(|state| {
            state.activity.fetching_assets = false;
            match result {
                Ok(ids) => {
                    state.push_diagnostic(format!("loaded {} collateral asset(s)", ids.len()));
                    state.inventory.replace_all(ids);
                }
                Err(error) => {
                    state.push_diagnostic(format!("error loading NFTs: {}", error));
                }
            }
        });
        true
    }

    /// Applies a loan fetch result; returns false if it was stale
    pub fn apply_loan(&self, generation: u64, result: Result<LoanRecord, ProviderError>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.update(|state| {
            state.activity.fetching_loan = false;
            match result {
                Ok(record) => {
                    state.loan = Some(record);
                }
                Err(error) => {
                    state.push_diagnostic(format!("error fetching loan: {}", error));
                }
            }
        });
        true
    }

    /// Records a diagnostic line outside of any other mutation
    pub fn push_diagnostic(&self, line: impl Into<String>) {
        self.update(|state| state.push_diagnostic(line));
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
