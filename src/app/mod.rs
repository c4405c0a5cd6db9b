//! Application orchestration layer
//!
//! This module coordinates between input, domain, chain and UI layers.
//! It owns the dashboard state, the subscribe/notify store and the
//! background chain worker.

pub mod controller;
pub mod state;
pub mod store;
pub mod worker;
