//! In-memory implementation of every store trait.

use async_trait::async_trait;
use rank_common::records::OwnerId;
use rank_common::{BalanceRecord, BindingRecord, IdentityRecord, RankResult};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::snapshot::Snapshot;
use crate::store::{BindingStore, IdentityStore, Ledger};

/// Records held behind async read/write locks.
///
/// Reads clone the matching rows; there is no indexing, which is fine for
/// the record counts of a single chat community.
#[derive(Debug, Default)]
pub struct MemoryStore {
    balances: RwLock<Vec<BalanceRecord>>,
    identities: RwLock<Vec<IdentityRecord>>,
    bindings: RwLock<Vec<BindingRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            balances: RwLock::new(snapshot.balances),
            identities: RwLock::new(snapshot.identities),
            bindings: RwLock::new(snapshot.bindings),
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            balances: self.balances.read().await.clone(),
            identities: self.identities.read().await.clone(),
            bindings: self.bindings.read().await.clone(),
        }
    }

    pub async fn add_balance(&self, record: BalanceRecord) {
        self.balances.write().await.push(record);
    }

    pub async fn add_binding(&self, record: BindingRecord) {
        self.bindings.write().await.push(record);
    }
}

#[async_trait]
impl Ledger for MemoryStore {
    async fn balances(&self) -> RankResult<Vec<BalanceRecord>> {
        Ok(self.balances.read().await.clone())
    }

    async fn balance(
        &self,
        owner_id: OwnerId,
        currency_kind: Option<&str>,
    ) -> RankResult<Vec<BalanceRecord>> {
        let balances = self.balances.read().await;
        Ok(balances
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .filter(|b| currency_kind.map_or(true, |c| b.currency_kind == c))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn identity(
        &self,
        external_user_id: &str,
        channel_id: &str,
    ) -> RankResult<Option<IdentityRecord>> {
        let identities = self.identities.read().await;
        Ok(identities
            .iter()
            .find(|i| i.external_user_id == external_user_id && i.channel_id == channel_id)
            .cloned())
    }

    async fn identities(
        &self,
        platform_kind: &str,
        channel_id: Option<&str>,
    ) -> RankResult<Vec<IdentityRecord>> {
        let identities = self.identities.read().await;
        Ok(identities
            .iter()
            .filter(|i| i.platform_kind == platform_kind)
            .filter(|i| channel_id.map_or(true, |c| i.channel_id == c))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, record), fields(user_id = %record.external_user_id, channel_id = %record.channel_id))]
    async fn upsert_identity(&self, record: IdentityRecord) -> RankResult<()> {
        let mut identities = self.identities.write().await;
        match identities.iter_mut().find(|i| {
            i.external_user_id == record.external_user_id && i.channel_id == record.channel_id
        }) {
            Some(existing) => {
                debug!("Replacing identity");
                *existing = record;
            }
            None => {
                debug!("Inserting identity");
                identities.push(record);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BindingStore for MemoryStore {
    async fn binding(
        &self,
        external_user_id: &str,
        platform_kind: &str,
    ) -> RankResult<Option<BindingRecord>> {
        let bindings = self.bindings.read().await;
        Ok(bindings
            .iter()
            .find(|b| b.external_user_id == external_user_id && b.platform_kind == platform_kind)
            .cloned())
    }

    async fn bindings(&self, platform_kind: &str) -> RankResult<Vec<BindingRecord>> {
        let bindings = self.bindings.read().await;
        Ok(bindings
            .iter()
            .filter(|b| b.platform_kind == platform_kind)
            .cloned()
            .collect())
    }
}
