//! Process-local store, used by tests and ephemeral runs.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::LevelStore;
use crate::error::StoreError;
use crate::leveling::model::{CooldownRecord, LevelUpSubscription, UserProgress};

#[derive(Default)]
struct Tables {
    users: HashMap<u64, UserProgress>,
    cooldowns: HashMap<(u64, u64), f64>,
    subscriptions: BTreeSet<LevelUpSubscription>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl LevelStore for MemoryStore {
    async fn get_user(&self, user_id: u64) -> Result<Option<UserProgress>, StoreError> {
        Ok(self.tables()?.users.get(&user_id).cloned())
    }

    async fn upsert_user(&self, user: &UserProgress) -> Result<(), StoreError> {
        self.tables()?.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserProgress>, StoreError> {
        let tables = self.tables()?;
        let mut users: Vec<UserProgress> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| b.level.cmp(&a.level));
        users.truncate(limit);
        Ok(users)
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.tables()?.users.len() as u64)
    }

    async fn get_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CooldownRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .cooldowns
            .get(&(guild_id, user_id))
            .map(|&last_grant_time| CooldownRecord {
                guild_id,
                user_id,
                last_grant_time,
            }))
    }

    async fn upsert_cooldown(&self, record: &CooldownRecord) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let slot = tables
            .cooldowns
            .entry((record.guild_id, record.user_id))
            .or_insert(record.last_grant_time);
        if record.last_grant_time > *slot {
            *slot = record.last_grant_time;
        }
        Ok(())
    }

    async fn list_subscriptions(&self, guild_id: u64) -> Result<Vec<u64>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.guild_id == guild_id)
            .map(|s| s.channel_id)
            .collect())
    }

    async fn all_subscriptions(&self) -> Result<Vec<LevelUpSubscription>, StoreError> {
        Ok(self.tables()?.subscriptions.iter().copied().collect())
    }

    async fn insert_subscription(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<bool, StoreError> {
        Ok(self.tables()?.subscriptions.insert(LevelUpSubscription {
            guild_id,
            channel_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cooldown_never_moves_backwards() {
        let store = MemoryStore::new();
        let record = CooldownRecord {
            guild_id: 1,
            user_id: 2,
            last_grant_time: 20.0,
        };
        store.upsert_cooldown(&record).await.unwrap();
        store
            .upsert_cooldown(&CooldownRecord {
                last_grant_time: 5.0,
                ..record
            })
            .await
            .unwrap();
        let stored = store.get_cooldown(1, 2).await.unwrap().unwrap();
        assert_eq!(stored.last_grant_time, 20.0);
    }

    #[tokio::test]
    async fn test_subscription_pairs() {
        let store = MemoryStore::new();
        assert!(store.insert_subscription(1, 10).await.unwrap());
        assert!(!store.insert_subscription(1, 10).await.unwrap());
        assert!(store.insert_subscription(2, 10).await.unwrap());
        assert_eq!(store.list_subscriptions(1).await.unwrap(), vec![10]);
        assert_eq!(store.all_subscriptions().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_top_users_limit() {
        let store = MemoryStore::new();
        for id in 1..=5u64 {
            let mut user = UserProgress::new(id, format!("u{}", id));
            user.level = id as i64;
            store.upsert_user(&user).await.unwrap();
        }
        let top = store.top_users(2).await.unwrap();
        assert_eq!(top.iter().map(|u| u.user_id).collect::<Vec<_>>(), vec![5, 4]);
    }
}
