//! ============================================================================
//! GATEKEEPER-CORE: Tiered access state machine
//! ============================================================================
//! This crate handles all entitlement logic for gated content tiers:
//! - Static per-tier keys and activation grants
//! - Once-per-calendar-day consumption of remaining days
//! - Whole-table persistence in a local redb slot store
//! - Session control for a single open gate at a time
//! ============================================================================

pub mod access;
pub mod clock;
pub mod config;
pub mod db;
pub mod types;

// Re-export main types for convenience
pub use access::{
    AccessDecision, EntitlementEngine, GateEvent, GateFlow, GateView, KeyRegistry,
    SessionController, Tier, VerificationSession,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::GatekeeperConfig;
pub use db::{
    EntitlementRecord, EntitlementStore, EntitlementTable, MemorySlotStore, RedbSlotStore,
    SlotStore,
};
pub use types::{GatekeeperError, VerificationOutcome};
