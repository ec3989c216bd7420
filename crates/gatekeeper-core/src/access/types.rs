//! ============================================================================
//! Access Types - Gated content tiers and their activation grants
//! ============================================================================
//! Defines the closed set of tiers and how many calendar days an activation
//! grants for each.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::GatekeeperError;

/// Days granted by activating the basic or triplets tier
pub const STANDARD_GRANT_DAYS: u32 = 19;

/// Days granted by activating the premium tier
pub const PREMIUM_GRANT_DAYS: u32 = 34;

/// Balances at or below this (but above zero) should prompt a renewal
pub const RENEWAL_WARNING_DAYS: u32 = 4;

/// Size of the closed tier set
pub const TIER_COUNT: usize = 3;

/// Gated content tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Daily basic forecast
    Basic,
    /// Triplets special
    Triplets,
    /// Premium VIP data
    Premium,
}

impl Tier {
    /// Every tier, in storage order
    pub const ALL: [Tier; TIER_COUNT] = [Tier::Basic, Tier::Triplets, Tier::Premium];

    /// Stable identifier used in persisted state
    pub fn id(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Triplets => "triplets",
            Tier::Premium => "premium",
        }
    }

    /// Get human-readable tier name
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Basic => "Basic Plan",
            Tier::Triplets => "Triplets Special",
            Tier::Premium => "Premium VIP",
        }
    }

    /// Days granted on a successful activation
    pub fn grant_days(&self) -> u32 {
        match self {
            Tier::Basic | Tier::Triplets => STANDARD_GRANT_DAYS,
            Tier::Premium => PREMIUM_GRANT_DAYS,
        }
    }

    /// Position in [`Tier::ALL`]
    pub(crate) fn index(&self) -> usize {
        match self {
            Tier::Basic => 0,
            Tier::Triplets => 1,
            Tier::Premium => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tier {
    type Err = GatekeeperError;

    /// Accepts canonical ids plus the legacy `basico` / `tripletas` names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "basico" => Ok(Tier::Basic),
            "triplets" | "tripletas" => Ok(Tier::Triplets),
            "premium" => Ok(Tier::Premium),
            _ => Err(GatekeeperError::UnknownTier(s.to_string())),
        }
    }
}
