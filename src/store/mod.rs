//! Storage capability set used by the leveling engine.
//!
//! The engine only talks to [`LevelStore`]; whether records live in the
//! SQLite [`crate::db::Database`] or in the process-local [`MemoryStore`]
//! is decided at startup.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::leveling::model::{CooldownRecord, LevelUpSubscription, UserProgress};

#[async_trait]
pub trait LevelStore: Send + Sync {
    // ==================== Users ====================

    async fn get_user(&self, user_id: u64) -> Result<Option<UserProgress>, StoreError>;

    /// Insert or replace the record keyed by `user.user_id`.
    async fn upsert_user(&self, user: &UserProgress) -> Result<(), StoreError>;

    /// Highest levels first; tie order is unspecified.
    async fn top_users(&self, limit: usize) -> Result<Vec<UserProgress>, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;

    // ==================== Cooldowns ====================

    async fn get_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CooldownRecord>, StoreError>;

    /// Must not move `last_grant_time` backwards for an existing pair.
    async fn upsert_cooldown(&self, record: &CooldownRecord) -> Result<(), StoreError>;

    // ==================== Subscriptions ====================

    async fn list_subscriptions(&self, guild_id: u64) -> Result<Vec<u64>, StoreError>;

    async fn all_subscriptions(&self) -> Result<Vec<LevelUpSubscription>, StoreError>;

    /// Returns `false` if the `(guild_id, channel_id)` pair already exists.
    async fn insert_subscription(&self, guild_id: u64, channel_id: u64)
        -> Result<bool, StoreError>;
}
