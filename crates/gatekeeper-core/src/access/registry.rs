//! ============================================================================
//! Key Registry - Shared secret per tier
//! ============================================================================
//! Keys are static shared strings compiled into the binary and compared in
//! plaintext. They are not derived from entitlement state and cannot be
//! changed at runtime.
//! ============================================================================

use super::types::Tier;

const BASIC_KEY: &str = "1234";
const TRIPLETS_KEY: &str = "5678";
const PREMIUM_KEY: &str = "9421";

/// Static tier -> key mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyRegistry;

impl KeyRegistry {
    /// The fixed secret for a tier
    pub fn key_for(tier: Tier) -> &'static str {
        match tier {
            Tier::Basic => BASIC_KEY,
            Tier::Triplets => TRIPLETS_KEY,
            Tier::Premium => PREMIUM_KEY,
        }
    }

    /// Case-sensitive match after trimming surrounding whitespace
    pub fn matches(tier: Tier, candidate: &str) -> bool {
        candidate.trim() == Self::key_for(tier)
    }
}
