//! Typed records exchanged with the ledger, identity and binding stores,
//! and the derived ranking rows.

use serde::{Deserialize, Serialize};

/// Internal numeric identity under which balances are recorded.
pub type OwnerId = u64;

/// Display name for users without a known name ("anonymous").
pub const ANONYMOUS_NAME: &str = "神秘人";

/// A balance row from the external ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub owner_id: OwnerId,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency_kind: String,
}

fn default_currency() -> String {
    "default".to_string()
}

impl BalanceRecord {
    pub fn new(owner_id: OwnerId, amount: f64, currency_kind: impl Into<String>) -> Self {
        Self {
            owner_id,
            amount,
            currency_kind: currency_kind.into(),
        }
    }
}

/// Display identity observed for a user in one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub owner_id: OwnerId,
    pub external_user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub channel_id: String,
    pub platform_kind: String,
}

/// Link between an external platform user id and an owner id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    pub external_user_id: String,
    #[serde(default)]
    pub binding_id: u64,
    pub owner_id: OwnerId,
    pub platform_kind: String,
}

/// One row of a computed ranking. Every string field is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub owner_id: OwnerId,
    pub value: i64,
    pub external_user_id: String,
    pub avatar_url: String,
    pub display_name: String,
    pub currency_kind: String,
    pub platform_kind: String,
    pub channel_id: String,
}

/// A ranking row prepared for chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDatum {
    pub name: String,
    pub external_user_id: String,
    pub avatar_url: String,
    pub value: i64,
    pub share_percent: f64,
    /// Encoded avatar image, filled in by the avatar fetch step.
    #[serde(skip)]
    pub avatar_raster: Option<Vec<u8>>,
}
