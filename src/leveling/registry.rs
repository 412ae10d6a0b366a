use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::error::StoreError;
use crate::store::LevelStore;

/// Level-up channel subscriptions per guild.
pub struct SubscriptionRegistry {
    store: Arc<dyn LevelStore>,
}

impl SubscriptionRegistry {
    pub fn new(store: Arc<dyn LevelStore>) -> Self {
        Self { store }
    }

    pub async fn list_channels(&self, guild_id: u64) -> Result<BTreeSet<u64>, StoreError> {
        Ok(self
            .store
            .list_subscriptions(guild_id)
            .await?
            .into_iter()
            .collect())
    }

    /// `false` if the pair is already registered. The store's uniqueness
    /// constraint decides, so concurrent adds cannot both succeed.
    pub async fn add_channel(&self, guild_id: u64, channel_id: u64) -> Result<bool, StoreError> {
        let added = self.store.insert_subscription(guild_id, channel_id).await?;
        if added {
            info!(
                "Registered level-up channel {} for guild {}",
                channel_id, guild_id
            );
        }
        Ok(added)
    }
}
