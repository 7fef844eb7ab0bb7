//! JSON snapshots of all stored records.

use std::path::Path;

use rank_common::{BalanceRecord, BindingRecord, IdentityRecord, RankResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything a [`crate::MemoryStore`] holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub balances: Vec<BalanceRecord>,
    pub identities: Vec<IdentityRecord>,
    pub bindings: Vec<BindingRecord>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> RankResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> RankResult<Self> {
        let path = path.as_ref();
        let snapshot = Self::from_json(&std::fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            balances = snapshot.balances.len(),
            identities = snapshot.identities.len(),
            bindings = snapshot.bindings.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> RankResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
