//! Configuration module for nifty-desk
//!
//! Concentrates the contract addresses and provider seed data shared
//! between startup wiring and the rest of the application.

pub mod settings;

pub use settings::{ConfigError, ContractAddresses, Settings, SimulationSettings};
