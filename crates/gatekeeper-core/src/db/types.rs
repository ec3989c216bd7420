//! ============================================================================
//! Database Types - Entitlement records as persisted in the slot store
//! ============================================================================
//! Wire shape of the table:
//! `{ "basic": { "days": 19, "lastAccess": "2026-02-22" }, ... }`
//! ============================================================================

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::access::{Tier, RENEWAL_WARNING_DAYS, TIER_COUNT};

/// Remaining entitlement for a single tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntitlementRecord {
    /// Calendar days left; zero means inactive or expired
    #[serde(rename = "days")]
    pub remaining_days: u32,
    /// Date of the last grant or daily consumption
    #[serde(rename = "lastAccess", default)]
    pub last_access: Option<NaiveDate>,
}

impl EntitlementRecord {
    /// Fresh grant dated `today`
    pub fn granted(days: u32, today: NaiveDate) -> Self {
        Self {
            remaining_days: days,
            last_access: Some(today),
        }
    }

    /// The tier must go through activation before it can be verified
    pub fn activation_required(&self) -> bool {
        self.remaining_days == 0
    }

    /// Still active but close to running out
    pub fn renewal_due(&self) -> bool {
        self.remaining_days > 0 && self.remaining_days <= RENEWAL_WARNING_DAYS
    }

    /// Whether `date` has already been charged against this record
    pub fn consumed_on(&self, date: NaiveDate) -> bool {
        self.last_access == Some(date)
    }
}

/// One record per tier, always complete
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntitlementTable {
    records: [EntitlementRecord; TIER_COUNT],
}

impl EntitlementTable {
    pub fn get(&self, tier: Tier) -> &EntitlementRecord {
        &self.records[tier.index()]
    }

    pub fn set(&mut self, tier: Tier, record: EntitlementRecord) {
        self.records[tier.index()] = record;
    }

    /// Records in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &EntitlementRecord)> {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }
}

impl Serialize for EntitlementTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TIER_COUNT))?;
        for (tier, record) in self.iter() {
            map.serialize_entry(tier.id(), record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EntitlementTable {
    /// Unknown tier keys are ignored and missing tiers keep the zero-day
    /// default. A canonical key wins over its legacy alias.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut table = EntitlementTable::default();

        for (key, value) in raw.iter() {
            let Ok(tier) = key.parse::<Tier>() else {
                continue;
            };
            if key.as_str() != tier.id() && raw.contains_key(tier.id()) {
                continue;
            }
            let record = EntitlementRecord::deserialize(value)
                .map_err(<D::Error as serde::de::Error>::custom)?;
            table.set(tier, record);
        }

        Ok(table)
    }
}
