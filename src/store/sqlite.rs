use async_trait::async_trait;

use super::LevelStore;
use crate::db::Database;
use crate::error::StoreError;
use crate::leveling::model::{CooldownRecord, LevelUpSubscription, UserProgress};

#[async_trait]
impl LevelStore for Database {
    async fn get_user(&self, user_id: u64) -> Result<Option<UserProgress>, StoreError> {
        self.run_blocking(move |db| db.get_user(user_id)).await
    }

    async fn upsert_user(&self, user: &UserProgress) -> Result<(), StoreError> {
        let user = user.clone();
        self.run_blocking(move |db| db.upsert_user(&user)).await
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserProgress>, StoreError> {
        self.run_blocking(move |db| db.top_users(limit)).await
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        self.run_blocking(|db| db.count_users()).await
    }

    async fn get_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CooldownRecord>, StoreError> {
        self.run_blocking(move |db| db.get_cooldown(guild_id, user_id))
            .await
    }

    async fn upsert_cooldown(&self, record: &CooldownRecord) -> Result<(), StoreError> {
        let record = *record;
        self.run_blocking(move |db| db.upsert_cooldown(&record)).await
    }

    async fn list_subscriptions(&self, guild_id: u64) -> Result<Vec<u64>, StoreError> {
        self.run_blocking(move |db| db.list_levelup_channels(guild_id))
            .await
    }

    async fn all_subscriptions(&self) -> Result<Vec<LevelUpSubscription>, StoreError> {
        self.run_blocking(|db| db.all_levelup_channels()).await
    }

    async fn insert_subscription(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<bool, StoreError> {
        self.run_blocking(move |db| db.add_levelup_channel(guild_id, channel_id))
            .await
    }
}
