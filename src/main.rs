//! nifty-desk entry point
//!
//! Wires configuration, the provider, the store and the controller
//! together, then runs the terminal event loop: drain chain signals, render
//! when the store changed, apply key input.

mod app;
mod chain;
mod config;
mod domain;
mod input;
mod ui;

use crate::app::controller::DashboardController;
use crate::app::store::StateStore;
use crate::app::worker::ChainWorker;
use crate::chain::provider::ChainProvider;
use crate::chain::sim::SimulatedChain;
use crate::config::Settings;
use crate::input::{UiAction, map_key};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::time::Duration;

/// RAII wrapper for the terminal
///
/// Restores the terminal even when the event loop exits early with an
/// error.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> std::io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("NIFTY_DESK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from("nifty-desk.json");
    local.exists().then_some(local)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default(settings_path().as_deref())?;

    // Development wiring: the simulated provider plays the injected wallet
    // and the deployed contracts.
    let provider = Arc::new(SimulatedChain::new(settings.simulation.account));
    provider.seed_collateral(settings.simulation.account, &settings.simulation.collateral_ids);

    let store = Arc::new(StateStore::new());
    let dirty = Arc::new(AtomicBool::new(true));
    let dirty_for_store = Arc::clone(&dirty);
    store.subscribe(Box::new(move || {
        dirty_for_store.store(true, Ordering::Release);
    }));

    let (signal_tx, signals) = channel();
    let worker = ChainWorker::spawn(
        Arc::clone(&provider) as Arc<dyn ChainProvider>,
        settings.contracts,
        signal_tx,
    );
    let controller = DashboardController::new(Arc::clone(&store), worker);

    let mut guard = TerminalGuard::new()?;
    controller.connect();

    loop {
        while let Ok(signal) = signals.try_recv() {
            controller.handle_signal(signal);
        }

        if dirty.swap(false, Ordering::AcqRel) {
            let snapshot = store.snapshot();
            guard.terminal.draw(|frame| ui::draw(frame, &snapshot))?;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(action) = map_key(key) {
                        if action == UiAction::Quit {
                            break;
                        }
                        controller.handle_action(action);
                    }
                }
                Event::Resize(_, _) => dirty.store(true, Ordering::Release),
                _ => {}
            }
        }
    }

    drop(guard);
    eprintln!("nifty-desk: shut down cleanly");
    Ok(())
}
