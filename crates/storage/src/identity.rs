//! Identity tracking from observed chat messages.
//!
//! Every message refreshes the author's display name and avatar for the
//! channel it was sent in. New identities take their owner id from the
//! platform account binding; authors without a binding are not tracked.

use rank_common::records::ANONYMOUS_NAME;
use rank_common::{IdentityRecord, RankResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::store::{BindingStore, IdentityStore};

/// Avatar stored when the author has none.
pub const OBSERVED_DEFAULT_AVATAR_URL: &str =
    "https://th.bing.com/th/id/OIP.s5N_QuGWAIWBmUyeNemQagHaHZ?w=512&h=512&c=7&r=0&o=5&dpr=1.3&pid=1.7";

/// Author details of one incoming message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedMessage {
    pub user_id: String,
    pub channel_id: String,
    pub platform: String,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl ObservedMessage {
    /// Nick, then name, then the anonymous placeholder. Empty strings count
    /// as missing.
    pub fn display_name(&self) -> &str {
        non_empty(&self.nick)
            .or_else(|| non_empty(&self.name))
            .unwrap_or(ANONYMOUS_NAME)
    }

    pub fn avatar_url(&self) -> &str {
        non_empty(&self.avatar).unwrap_or(OBSERVED_DEFAULT_AVATAR_URL)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// What [`record_author`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityUpdate {
    Created(IdentityRecord),
    Updated(IdentityRecord),
    Unchanged,
    /// No identity existed and the author has no account binding.
    NoBinding,
}

/// Create or refresh the author's identity for the message's channel.
pub async fn record_author(
    identities: &dyn IdentityStore,
    bindings: &dyn BindingStore,
    message: &ObservedMessage,
) -> RankResult<IdentityUpdate> {
    let name = message.display_name();
    let avatar = message.avatar_url();

    match identities
        .identity(&message.user_id, &message.channel_id)
        .await?
    {
        None => {
            let Some(binding) = bindings
                .binding(&message.user_id, &message.platform)
                .await?
            else {
                warn!(
                    user_id = %message.user_id,
                    platform = %message.platform,
                    "No account binding for message author, identity not tracked"
                );
                return Ok(IdentityUpdate::NoBinding);
            };

            let record = IdentityRecord {
                owner_id: binding.owner_id,
                external_user_id: message.user_id.clone(),
                display_name: name.to_string(),
                avatar_url: Some(avatar.to_string()),
                channel_id: message.channel_id.clone(),
                platform_kind: message.platform.clone(),
            };
            identities.upsert_identity(record.clone()).await?;
            info!(
                user_id = %record.external_user_id,
                channel_id = %record.channel_id,
                owner_id = record.owner_id,
                "Tracking new identity"
            );
            Ok(IdentityUpdate::Created(record))
        }
        Some(existing)
            if existing.display_name != name
                || existing.avatar_url.as_deref() != Some(avatar) =>
        {
            let record = IdentityRecord {
                display_name: name.to_string(),
                avatar_url: Some(avatar.to_string()),
                ..existing
            };
            identities.upsert_identity(record.clone()).await?;
            debug!(
                user_id = %record.external_user_id,
                channel_id = %record.channel_id,
                "Identity refreshed"
            );
            Ok(IdentityUpdate::Updated(record))
        }
        Some(_) => Ok(IdentityUpdate::Unchanged),
    }
}
