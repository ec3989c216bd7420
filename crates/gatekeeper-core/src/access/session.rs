//! ============================================================================
//! Session Controller - One gate at a time over the entitlement engine
//! ============================================================================
//! Tracks which tier's gate is open, the key typed so far and the last
//! outcome. Submitting routes to activation when the tier has no days left
//! and to verification otherwise. Closing a gate wipes the session so no key
//! or stale outcome carries over to the next one.
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{AccessDecision, EntitlementEngine};
use super::types::Tier;
use crate::clock::Clock;
use crate::db::SlotStore;
use crate::types::{GatekeeperError, VerificationOutcome};

/// Transient verification context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VerificationSession {
    #[default]
    NoSession,
    Verifying {
        tier: Tier,
        candidate_key: String,
        outcome: VerificationOutcome,
    },
}

impl VerificationSession {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            VerificationSession::NoSession => None,
            VerificationSession::Verifying { tier, .. } => Some(*tier),
        }
    }

    pub fn outcome(&self) -> VerificationOutcome {
        match self {
            VerificationSession::NoSession => VerificationOutcome::Unknown,
            VerificationSession::Verifying { outcome, .. } => *outcome,
        }
    }
}

/// Which operation a submit will perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateFlow {
    Activate,
    Verify,
}

/// Signals for the UI collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GateEvent {
    TierSelected { tier: Tier },
    Outcome {
        tier: Tier,
        outcome: VerificationOutcome,
        decision: AccessDecision,
    },
    GateClosed { tier: Tier },
}

/// Snapshot of the open gate for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateView {
    pub tier: Tier,
    pub flow: GateFlow,
    pub remaining_days: u32,
    pub activation_required: bool,
    pub renewal_due: bool,
    pub outcome: VerificationOutcome,
}

pub struct SessionController<S: SlotStore, C: Clock> {
    engine: EntitlementEngine<S, C>,
    session: VerificationSession,
    events: Vec<GateEvent>,
}

impl<S: SlotStore, C: Clock> SessionController<S, C> {
    pub fn new(engine: EntitlementEngine<S, C>) -> Self {
        Self {
            engine,
            session: VerificationSession::NoSession,
            events: Vec::new(),
        }
    }

    pub fn engine(&self) -> &EntitlementEngine<S, C> {
        &self.engine
    }

    pub fn session(&self) -> &VerificationSession {
        &self.session
    }

    /// Activation when the tier has no days left, verification otherwise
    pub fn flow_for(&self, tier: Tier) -> GateFlow {
        if self.engine.activation_required(tier) {
            GateFlow::Activate
        } else {
            GateFlow::Verify
        }
    }

    /// Open a fresh session for `tier`, closing any open one first
    pub fn open_gate(&mut self, tier: Tier) -> GateView {
        if self.session.tier().is_some() {
            self.close_gate();
        }

        debug!("Opening gate for {}", tier);
        self.session = VerificationSession::Verifying {
            tier,
            candidate_key: String::new(),
            outcome: VerificationOutcome::Unknown,
        };
        self.events.push(GateEvent::TierSelected { tier });
        self.view_for(tier, VerificationOutcome::Unknown)
    }

    /// Replace the candidate key for the open gate
    pub fn set_candidate_key(&mut self, key: &str) -> Result<(), GatekeeperError> {
        match &mut self.session {
            VerificationSession::NoSession => Err(GatekeeperError::NoActiveGate),
            VerificationSession::Verifying { candidate_key, .. } => {
                *candidate_key = key.to_string();
                Ok(())
            }
        }
    }

    /// Run the open gate's flow with the current candidate key.
    /// Each call is an independent attempt.
    pub fn submit(&mut self) -> Result<AccessDecision, GatekeeperError> {
        let (tier, key) = match &self.session {
            VerificationSession::NoSession => return Err(GatekeeperError::NoActiveGate),
            VerificationSession::Verifying { tier, candidate_key, .. } => {
                (*tier, candidate_key.clone())
            }
        };

        let decision = match self.flow_for(tier) {
            GateFlow::Activate => self.engine.activate(tier, &key),
            GateFlow::Verify => self.engine.verify(tier, &key),
        };
        let outcome = decision.outcome();

        if let VerificationSession::Verifying { outcome: current, .. } = &mut self.session {
            *current = outcome;
        }
        self.events.push(GateEvent::Outcome { tier, outcome, decision });
        Ok(decision)
    }

    /// Close the open gate and reset every session field.
    /// Returns the tier that was open, if any.
    pub fn close_gate(&mut self) -> Option<Tier> {
        let tier = self.session.tier()?;
        self.session = VerificationSession::NoSession;
        self.events.push(GateEvent::GateClosed { tier });
        debug!("Closed gate for {}", tier);
        Some(tier)
    }

    /// Current gate snapshot, `None` when no gate is open
    pub fn view(&self) -> Option<GateView> {
        let tier = self.session.tier()?;
        Some(self.view_for(tier, self.session.outcome()))
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GateEvent> {
        std::mem::take(&mut self.events)
    }

    fn view_for(&self, tier: Tier, outcome: VerificationOutcome) -> GateView {
        let record = self.engine.record(tier);
        GateView {
            tier,
            flow: self.flow_for(tier),
            remaining_days: record.remaining_days,
            activation_required: record.activation_required(),
            renewal_due: record.renewal_due(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{parse_date, FixedClock};
    use crate::db::{EntitlementStore, MemorySlotStore};

    fn controller_on(day: &str) -> (SessionController<MemorySlotStore, FixedClock>, FixedClock) {
        let clock = FixedClock::new(parse_date(day).unwrap());
        let engine = EntitlementEngine::new(EntitlementStore::new(MemorySlotStore::new()), clock.clone());
        (SessionController::new(engine), clock)
    }

    fn attempt(
        controller: &mut SessionController<MemorySlotStore, FixedClock>,
        tier: Tier,
        key: &str,
    ) -> AccessDecision {
        controller.open_gate(tier);
        controller.set_candidate_key(key).unwrap();
        let decision = controller.submit().unwrap();
        controller.close_gate();
        decision
    }

    #[test]
    fn test_no_session_by_default() {
        let (mut controller, _) = controller_on("2026-02-22");
        assert_eq!(controller.session(), &VerificationSession::NoSession);
        assert_eq!(controller.view(), None);
        assert_eq!(controller.submit(), Err(GatekeeperError::NoActiveGate));
        assert_eq!(controller.set_candidate_key("1234"), Err(GatekeeperError::NoActiveGate));
        assert_eq!(controller.close_gate(), None);
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn test_open_gate_on_inactive_tier_routes_to_activation() {
        let (mut controller, _) = controller_on("2026-02-22");
        let view = controller.open_gate(Tier::Premium);

        assert_eq!(view.flow, GateFlow::Activate);
        assert!(view.activation_required);
        assert_eq!(view.remaining_days, 0);
        assert_eq!(view.outcome, VerificationOutcome::Unknown);
        assert_eq!(
            controller.session(),
            &VerificationSession::Verifying {
                tier: Tier::Premium,
                candidate_key: String::new(),
                outcome: VerificationOutcome::Unknown,
            }
        );
    }

    #[test]
    fn test_submit_activates_then_verifies() {
        let (mut controller, clock) = controller_on("2026-02-22");

        let decision = attempt(&mut controller, Tier::Basic, "1234");
        assert_eq!(decision, AccessDecision::Activated { tier: Tier::Basic, remaining_days: 19 });
        assert_eq!(controller.flow_for(Tier::Basic), GateFlow::Verify);

        clock.advance_days(1);
        let decision = attempt(&mut controller, Tier::Basic, "1234");
        assert_eq!(
            decision,
            AccessDecision::Admitted { tier: Tier::Basic, remaining_days: 18, day_consumed: true }
        );
    }

    #[test]
    fn test_failed_submit_keeps_gate_open_for_retry() {
        let (mut controller, _) = controller_on("2026-02-22");
        controller.open_gate(Tier::Triplets);

        controller.set_candidate_key("0000").unwrap();
        assert_eq!(controller.submit().unwrap().outcome(), VerificationOutcome::Invalid);
        assert_eq!(controller.view().unwrap().outcome, VerificationOutcome::Invalid);

        controller.set_candidate_key("5678").unwrap();
        assert_eq!(controller.submit().unwrap().outcome(), VerificationOutcome::Valid);
        let view = controller.view().unwrap();
        assert_eq!(view.outcome, VerificationOutcome::Valid);
        assert_eq!(view.remaining_days, 19);
        assert_eq!(view.flow, GateFlow::Verify);
    }

    #[test]
    fn test_close_gate_resets_everything() {
        let (mut controller, _) = controller_on("2026-02-22");
        controller.open_gate(Tier::Basic);
        controller.set_candidate_key("1234").unwrap();
        controller.submit().unwrap();

        assert_eq!(controller.close_gate(), Some(Tier::Basic));
        assert_eq!(controller.session(), &VerificationSession::NoSession);

        // Next gate starts clean, even for another tier
        controller.open_gate(Tier::Premium);
        assert_eq!(
            controller.session(),
            &VerificationSession::Verifying {
                tier: Tier::Premium,
                candidate_key: String::new(),
                outcome: VerificationOutcome::Unknown,
            }
        );
        assert_eq!(controller.submit().unwrap(), AccessDecision::KeyMismatch { tier: Tier::Premium });
    }

    #[test]
    fn test_opening_another_gate_closes_current() {
        let (mut controller, _) = controller_on("2026-02-22");
        controller.open_gate(Tier::Basic);
        controller.set_candidate_key("1234").unwrap();
        controller.open_gate(Tier::Triplets);

        assert_eq!(controller.session().tier(), Some(Tier::Triplets));
        assert_eq!(
            controller.drain_events(),
            vec![
                GateEvent::TierSelected { tier: Tier::Basic },
                GateEvent::GateClosed { tier: Tier::Basic },
                GateEvent::TierSelected { tier: Tier::Triplets },
            ]
        );
    }

    #[test]
    fn test_exhausted_tier_routes_back_to_activation() {
        let (mut controller, clock) = controller_on("2026-01-01");
        attempt(&mut controller, Tier::Basic, "1234");

        for _ in 0..19 {
            clock.advance_days(1);
            let decision = attempt(&mut controller, Tier::Basic, "1234");
            assert_eq!(decision.outcome(), VerificationOutcome::Valid);
        }
        assert_eq!(controller.engine().record(Tier::Basic).remaining_days, 0);

        clock.advance_days(1);
        let view = controller.open_gate(Tier::Basic);
        assert_eq!(view.flow, GateFlow::Activate);
        assert!(view.activation_required);

        controller.set_candidate_key("1234").unwrap();
        assert!(matches!(controller.submit().unwrap(), AccessDecision::Activated { .. }));
    }

    #[test]
    fn test_events_sequence() {
        let (mut controller, _) = controller_on("2026-02-22");
        attempt(&mut controller, Tier::Premium, "9421");

        let events = controller.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], GateEvent::TierSelected { tier: Tier::Premium });
        assert_eq!(
            events[1],
            GateEvent::Outcome {
                tier: Tier::Premium,
                outcome: VerificationOutcome::Valid,
                decision: AccessDecision::Activated { tier: Tier::Premium, remaining_days: 34 },
            }
        );
        assert_eq!(events[2], GateEvent::GateClosed { tier: Tier::Premium });
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn test_view_flags_renewal() {
        let (mut controller, clock) = controller_on("2026-01-01");
        attempt(&mut controller, Tier::Basic, "1234");
        for _ in 0..15 {
            clock.advance_days(1);
            attempt(&mut controller, Tier::Basic, "1234");
        }

        let view = controller.open_gate(Tier::Basic);
        assert_eq!(view.remaining_days, 4);
        assert!(view.renewal_due);
        assert!(!view.activation_required);
    }
}
