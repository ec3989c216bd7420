//! ============================================================================
//! Core Types - Outcomes and errors shared across the gatekeeper
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Last verification outcome as seen by the UI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Nothing submitted yet in this session
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationOutcome::Valid)
    }
}

/// Error types for the gatekeeper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GatekeeperError {
    #[error("Unknown tier '{0}'. Valid values: basic, triplets, premium")]
    UnknownTier(String),

    #[error("No gate is open; select a tier first")]
    NoActiveGate,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
