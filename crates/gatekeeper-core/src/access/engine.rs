//! ============================================================================
//! Entitlement Engine - Activation and once-per-day verification
//! ============================================================================
//! Owns the in-memory entitlement table for the process. The table is loaded
//! from the store once, mutated in place, and written back in full after
//! every state-changing decision.
//!
//! - **Activate**: correct key resets the tier to its grant, dated today
//! - **Verify**: correct key on an active tier charges at most one day per
//!   calendar date; a zero balance is reported as activation-required
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::registry::KeyRegistry;
use super::types::Tier;
use crate::clock::Clock;
use crate::db::{EntitlementRecord, EntitlementStore, EntitlementTable, SlotStore};
use crate::types::VerificationOutcome;

/// Result of an activation or verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Key accepted, balance reset to the tier's grant
    Activated { tier: Tier, remaining_days: u32 },
    /// Key accepted on an active tier
    Admitted {
        tier: Tier,
        remaining_days: u32,
        /// This attempt charged today's day against the balance
        day_consumed: bool,
    },
    /// Key did not match; nothing changed
    KeyMismatch { tier: Tier },
    /// Balance is zero; the caller must route to activation
    ActivationRequired { tier: Tier },
}

impl AccessDecision {
    pub fn tier(&self) -> Tier {
        match self {
            AccessDecision::Activated { tier, .. }
            | AccessDecision::Admitted { tier, .. }
            | AccessDecision::KeyMismatch { tier }
            | AccessDecision::ActivationRequired { tier } => *tier,
        }
    }

    /// Collapse to the three-valued outcome shown to the user
    pub fn outcome(&self) -> VerificationOutcome {
        match self {
            AccessDecision::Activated { .. } | AccessDecision::Admitted { .. } => {
                VerificationOutcome::Valid
            }
            AccessDecision::KeyMismatch { .. } | AccessDecision::ActivationRequired { .. } => {
                VerificationOutcome::Invalid
            }
        }
    }

    /// Human-readable summary
    pub fn message(&self) -> String {
        match self {
            AccessDecision::Activated { tier, remaining_days } => format!(
                "{} activated: {} days available",
                tier.display_name(),
                remaining_days
            ),
            AccessDecision::Admitted { tier, remaining_days, .. } => format!(
                "{} access granted: {} days remaining",
                tier.display_name(),
                remaining_days
            ),
            AccessDecision::KeyMismatch { tier } => {
                format!("Incorrect key for {}", tier.display_name())
            }
            AccessDecision::ActivationRequired { tier } => format!(
                "{} has expired or was never activated. Enter a new key to activate it.",
                tier.display_name()
            ),
        }
    }
}

/// Decision logic over the entitlement table
pub struct EntitlementEngine<S: SlotStore, C: Clock> {
    store: EntitlementStore<S>,
    clock: C,
    table: EntitlementTable,
}

impl<S: SlotStore, C: Clock> EntitlementEngine<S, C> {
    /// Load the table from `store` (defaults if absent or corrupt)
    pub fn new(store: EntitlementStore<S>, clock: C) -> Self {
        let table = store.load();
        Self { store, clock, table }
    }

    /// Grant the tier's fixed entitlement if the key matches.
    /// Any prior balance is replaced, not added to.
    pub fn activate(&mut self, tier: Tier, candidate_key: &str) -> AccessDecision {
        if !KeyRegistry::matches(tier, candidate_key) {
            warn!("Activation rejected for {}: key mismatch", tier);
            return AccessDecision::KeyMismatch { tier };
        }

        let today = self.clock.today();
        let record = EntitlementRecord::granted(tier.grant_days(), today);
        self.table.set(tier, record);
        self.persist();

        info!("Activated {} with {} days on {}", tier, record.remaining_days, today);
        AccessDecision::Activated {
            tier,
            remaining_days: record.remaining_days,
        }
    }

    /// Admit access to an active tier, charging at most one day per date
    pub fn verify(&mut self, tier: Tier, candidate_key: &str) -> AccessDecision {
        let current = *self.table.get(tier);

        // Zero balance is not a key question; the key is not compared
        if current.activation_required() {
            warn!("Verification blocked for {}: no remaining days", tier);
            return AccessDecision::ActivationRequired { tier };
        }

        if !KeyRegistry::matches(tier, candidate_key) {
            warn!("Verification rejected for {}: key mismatch", tier);
            return AccessDecision::KeyMismatch { tier };
        }

        let today = self.clock.today();
        if current.consumed_on(today) {
            debug!("{} already charged for {}, no decrement", tier, today);
            return AccessDecision::Admitted {
                tier,
                remaining_days: current.remaining_days,
                day_consumed: false,
            };
        }

        let record = EntitlementRecord {
            remaining_days: current.remaining_days.saturating_sub(1),
            last_access: Some(today),
        };
        self.table.set(tier, record);
        self.persist();

        info!(
            "Charged one day to {} on {}: {} days remaining",
            tier, today, record.remaining_days
        );
        AccessDecision::Admitted {
            tier,
            remaining_days: record.remaining_days,
            day_consumed: true,
        }
    }

    pub fn record(&self, tier: Tier) -> &EntitlementRecord {
        self.table.get(tier)
    }

    pub fn table(&self) -> &EntitlementTable {
        &self.table
    }

    /// True when the tier must be activated before it can be verified
    pub fn activation_required(&self, tier: Tier) -> bool {
        self.record(tier).activation_required()
    }

    pub fn renewal_due(&self, tier: Tier) -> bool {
        self.record(tier).renewal_due()
    }

    pub fn store(&self) -> &EntitlementStore<S> {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Write the whole table. A failed write keeps the in-memory state.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.table) {
            warn!("Failed to persist entitlements: {} - keeping in-memory state", e);
        }
    }
}
