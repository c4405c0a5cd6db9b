//! Provider boundary and contract clients
//!
//! This module encapsulates all interaction with the wallet provider and
//! the deployed contracts, and provides a clean trait-shaped interface to
//! the rest of the application.

pub mod contracts;
pub mod provider;
pub mod sim;

pub use provider::{ChainProvider, ExecutionContext, ProviderError};
