//! ============================================================================
//! Access Module - Key-activated, day-metered access to content tiers
//! ============================================================================
//! Each tier is unlocked with a shared key. Activation grants a fixed number
//! of calendar days; every later day the tier is opened costs one of them.
//!
//! ## Tiers
//! - **Basic**: 19 days per activation
//! - **Triplets**: 19 days per activation
//! - **Premium**: 34 days per activation
//!
//! ## Usage
//! ```rust,ignore
//! use gatekeeper_core::access::{EntitlementEngine, SessionController, Tier};
//! use gatekeeper_core::db::{EntitlementStore, MemorySlotStore};
//! use gatekeeper_core::clock::SystemClock;
//!
//! let engine = EntitlementEngine::new(EntitlementStore::new(MemorySlotStore::new()), SystemClock);
//! let mut gate = SessionController::new(engine);
//! gate.open_gate(Tier::Basic);
//! gate.set_candidate_key("1234")?;
//! let decision = gate.submit()?;
//! gate.close_gate();
//! ```
//! ============================================================================

mod engine;
mod registry;
mod session;
mod types;

// Re-export public types
pub use engine::{AccessDecision, EntitlementEngine};
pub use registry::KeyRegistry;
pub use session::{GateEvent, GateFlow, GateView, SessionController, VerificationSession};
pub use types::{
    Tier, PREMIUM_GRANT_DAYS, RENEWAL_WARNING_DAYS, STANDARD_GRANT_DAYS, TIER_COUNT,
};
