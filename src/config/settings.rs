//! Dashboard configuration
//!
//! The three contract addresses the dashboard talks to, plus the seed data
//! for the simulated provider used in development. Loaded from a JSON file
//! when one is supplied, otherwise the built-in development defaults apply.

use crate::domain::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Development deployment of the collateral NFT contract
pub const DEV_COLLATERAL_NFT: Address = Address::from_bytes([
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64, 0x2f,
    0x64, 0x18, 0x0a, 0xa3,
]);

/// Development deployment of the loan token contract
pub const DEV_LOAN_TOKEN: Address = Address::from_bytes([
    0xe7, 0xf1, 0x72, 0x5e, 0x77, 0x34, 0xce, 0x28, 0x8f, 0x83, 0x67, 0xe1, 0xbb, 0x14, 0x3e, 0x90,
    0xbb, 0x3f, 0x05, 0x12,
]);

/// Development deployment of the lending contract
pub const DEV_LENDING_DESK: Address = Address::from_bytes([
    0x9f, 0xe4, 0x67, 0x36, 0x67, 0x9d, 0x2d, 0x9a, 0x65, 0xf0, 0x99, 0x2f, 0x22, 0x72, 0xde, 0x9f,
    0x3c, 0x7f, 0xa6, 0xe0,
]);

/// Development account granted by the simulated wallet
pub const DEV_ACCOUNT: Address = Address::from_bytes([
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79, 0xcf,
    0xff, 0xb9, 0x22, 0x66,
]);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{role_a} and {role_b} share the address {address}")]
    DuplicateAddress {
        role_a: &'static str,
        role_b: &'static str,
        address: Address,
    },
}

/// Addresses of the three contracts the dashboard calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub collateral_nft: Address,
    pub loan_token: Address,
    pub lending_desk: Address,
}

impl ContractAddresses {
    /// The three roles must resolve to three distinct contracts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let roles = [
            ("collateral_nft", self.collateral_nft),
            ("loan_token", self.loan_token),
            ("lending_desk", self.lending_desk),
        ];
        for (i, (role_a, addr_a)) in roles.iter().enumerate() {
            for (role_b, addr_b) in roles.iter().skip(i + 1) {
                if addr_a == addr_b {
                    return Err(ConfigError::DuplicateAddress {
                        role_a,
                        role_b,
                        address: *addr_a,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            collateral_nft: DEV_COLLATERAL_NFT,
            loan_token: DEV_LOAN_TOKEN,
            lending_desk: DEV_LENDING_DESK,
        }
    }
}

/// Seed data for the simulated provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Account granted on connection
    pub account: Address,
    /// Collateral NFT ids the account starts with
    pub collateral_ids: Vec<u64>,
}

impl SimulationSettings {
    /// Drops duplicate ids while preserving first-seen order
    fn sanitize(&mut self) {
        let mut seen = Vec::with_capacity(self.collateral_ids.len());
        self.collateral_ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            account: DEV_ACCOUNT,
            collateral_ids: vec![1, 7, 12],
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub contracts: ContractAddresses,
    pub simulation: SimulationSettings,
}

impl Settings {
    /// Loads, sanitizes and validates settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.simulation.sanitize();
        settings.contracts.validate()?;
        Ok(settings)
    }

    /// Loads from the given path, or falls back to development defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
