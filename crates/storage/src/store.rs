//! Collaborator traits.

use async_trait::async_trait;
use rank_common::records::OwnerId;
use rank_common::{BalanceRecord, BindingRecord, IdentityRecord, RankResult};

/// Read-only currency ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Every balance row, in ledger order.
    async fn balances(&self) -> RankResult<Vec<BalanceRecord>>;

    /// Balances of one owner, optionally restricted to one currency.
    async fn balance(
        &self,
        owner_id: OwnerId,
        currency_kind: Option<&str>,
    ) -> RankResult<Vec<BalanceRecord>>;
}

/// Per-channel display identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn identity(
        &self,
        external_user_id: &str,
        channel_id: &str,
    ) -> RankResult<Option<IdentityRecord>>;

    /// Identities on a platform, optionally restricted to one channel.
    async fn identities(
        &self,
        platform_kind: &str,
        channel_id: Option<&str>,
    ) -> RankResult<Vec<IdentityRecord>>;

    /// Insert or replace the identity keyed by user id and channel id.
    async fn upsert_identity(&self, record: IdentityRecord) -> RankResult<()>;
}

/// Account linking between platform users and ledger owners.
#[async_trait]
pub trait BindingStore: Send + Sync {
    async fn binding(
        &self,
        external_user_id: &str,
        platform_kind: &str,
    ) -> RankResult<Option<BindingRecord>>;

    async fn bindings(&self, platform_kind: &str) -> RankResult<Vec<BindingRecord>>;
}
