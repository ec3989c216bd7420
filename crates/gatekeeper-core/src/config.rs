//! ============================================================================
//! Configuration - Where entitlement state is kept
//! ============================================================================
//! Resolved from the environment (`GATEKEEPER_DB_PATH`, `GATEKEEPER_SLOT`)
//! with command-line overrides applied by the caller.
//! ============================================================================

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::db::DEFAULT_SLOT;

pub const DB_PATH_ENV: &str = "GATEKEEPER_DB_PATH";
pub const SLOT_ENV: &str = "GATEKEEPER_SLOT";

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Database file; `None` means `~/.gatekeeper/entitlements.redb`
    pub db_path: Option<PathBuf>,
    /// Slot holding the entitlement table
    pub slot: String,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl GatekeeperConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(slot) = lookup(SLOT_ENV).filter(|s| !s.trim().is_empty()) {
            config.slot = slot.trim().to_string();
        }
        config
    }

    /// Database path to open, creating the default directory if needed
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        let dir = home.join(".gatekeeper");
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow!("Failed to create .gatekeeper directory: {}", e))?;
        Ok(dir.join("entitlements.redb"))
    }
}
