//! Joins balances with identity and binding records.

use std::collections::HashMap;

use rank_common::records::OwnerId;
use rank_common::{BalanceRecord, BindingRecord, IdentityRecord, RankEntry};

/// External user id used when neither identity nor binding is known.
pub const PLACEHOLDER_USER_ID: &str = "123456789";

/// Platform and channel fallback.
pub const UNKNOWN: &str = "unknown";

pub use rank_common::records::ANONYMOUS_NAME;

/// Avatar used when the identity has none.
pub const DEFAULT_AVATAR_URL: &str =
    "https://th.bing.com/th/id/OIP.s5N_QuGWAIWBmUyeNemQagHaHZ?w=185&h=184&c=7&r=0&o=5&dpr=1.3&pid=1.7";

/// Platform whose avatars always come from the QQ avatar service.
pub const ONEBOT_PLATFORM: &str = "onebot";

/// Avatar URL convention for QQ accounts.
pub fn qq_avatar_url(user_id: &str) -> String {
    format!("https://q.qlogo.cn/g?b=qq&s=640&nk={}", user_id)
}

/// Build the ranking for a set of balances.
///
/// Every balance produces exactly one entry. Missing identity or binding
/// data falls back to placeholders. The result is sorted by value,
/// descending, and equal values keep their input order.
pub fn build_ranking(
    balances: &[BalanceRecord],
    identities: &[IdentityRecord],
    bindings: &[BindingRecord],
) -> Vec<RankEntry> {
    // Later records win for the same owner.
    let identity_by_owner: HashMap<OwnerId, &IdentityRecord> =
        identities.iter().map(|i| (i.owner_id, i)).collect();
    let binding_by_owner: HashMap<OwnerId, &BindingRecord> =
        bindings.iter().map(|b| (b.owner_id, b)).collect();

    let mut entries: Vec<RankEntry> = balances
        .iter()
        .map(|balance| {
            resolve_entry(
                balance,
                identity_by_owner.get(&balance.owner_id).copied(),
                binding_by_owner.get(&balance.owner_id).copied(),
            )
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.value.cmp(&a.value));

    tracing::debug!(
        balances = balances.len(),
        identities = identities.len(),
        bindings = bindings.len(),
        "Built ranking"
    );

    entries
}

fn resolve_entry(
    balance: &BalanceRecord,
    identity: Option<&IdentityRecord>,
    binding: Option<&BindingRecord>,
) -> RankEntry {
    let external_user_id = first_non_empty(
        [
            identity.map(|i| i.external_user_id.as_str()),
            binding.map(|b| b.external_user_id.as_str()),
        ],
        PLACEHOLDER_USER_ID,
    );
    let platform_kind = first_non_empty(
        [
            identity.map(|i| i.platform_kind.as_str()),
            binding.map(|b| b.platform_kind.as_str()),
        ],
        UNKNOWN,
    );

    let avatar_url = if platform_kind == ONEBOT_PLATFORM {
        qq_avatar_url(&external_user_id)
    } else {
        first_non_empty(
            [identity.and_then(|i| i.avatar_url.as_deref())],
            DEFAULT_AVATAR_URL,
        )
    };

    RankEntry {
        owner_id: balance.owner_id,
        value: round_half_up(balance.amount),
        external_user_id,
        avatar_url,
        display_name: first_non_empty(
            [identity.map(|i| i.display_name.as_str())],
            ANONYMOUS_NAME,
        ),
        currency_kind: balance.currency_kind.clone(),
        platform_kind,
        channel_id: first_non_empty([identity.map(|i| i.channel_id.as_str())], UNKNOWN),
    }
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N], fallback: &str) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Round to the nearest integer with halves going toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    // Adding 0.5 first would round 0.49999999999999994 up.
    let floor = value.floor();
    if value - floor >= 0.5 {
        (floor + 1.0) as i64
    } else {
        floor as i64
    }
}
