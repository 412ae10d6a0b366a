//! Per-guild anti-spam gate for experience grants.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::keyed::KeyedLocks;
use super::model::CooldownRecord;
use crate::error::StoreError;
use crate::store::LevelStore;

pub struct CooldownGate {
    store: Arc<dyn LevelStore>,
    window: f64,
    locks: KeyedLocks<(u64, u64)>,
}

impl CooldownGate {
    pub fn new(store: Arc<dyn LevelStore>, window: Duration) -> Self {
        Self {
            store,
            window: window.as_secs_f64(),
            locks: KeyedLocks::new(),
        }
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// True if nothing was granted for this pair yet, or the last grant is at
    /// least one window old.
    pub async fn is_eligible(
        &self,
        guild_id: u64,
        user_id: u64,
        now: f64,
    ) -> Result<bool, StoreError> {
        let record = self.store.get_cooldown(guild_id, user_id).await?;
        Ok(self.eligible_after(record.as_ref(), now))
    }

    pub async fn record_grant(
        &self,
        guild_id: u64,
        user_id: u64,
        now: f64,
    ) -> Result<(), StoreError> {
        self.store
            .upsert_cooldown(&CooldownRecord {
                guild_id,
                user_id,
                last_grant_time: now,
            })
            .await
    }

    /// Check and consume the cooldown as one step for the pair.
    ///
    /// At most one concurrent caller per `(guild_id, user_id)` sees `true` within
    /// a window. The grant time is committed before this returns, so a later
    /// failure downstream does not give the cooldown back.
    pub async fn try_acquire(
        &self,
        guild_id: u64,
        user_id: u64,
        now: f64,
    ) -> Result<bool, StoreError> {
        let _guard = self.locks.lock((guild_id, user_id)).await;
        if !self.is_eligible(guild_id, user_id, now).await? {
            debug!("User {} still on cooldown in guild {}", user_id, guild_id);
            return Ok(false);
        }
        self.record_grant(guild_id, user_id, now).await?;
        Ok(true)
    }

    fn eligible_after(&self, record: Option<&CooldownRecord>, now: f64) -> bool {
        match record {
            None => true,
            Some(record) => now - record.last_grant_time >= self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn gate() -> CooldownGate {
        CooldownGate::new(Arc::new(MemoryStore::new()), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_window_boundaries() {
        let gate = gate();
        assert!(gate.try_acquire(1, 2, 0.0).await.unwrap());
        assert!(!gate.try_acquire(1, 2, 9.9).await.unwrap());
        assert!(gate.try_acquire(1, 2, 10.0).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_attempt_does_not_extend_cooldown() {
        let gate = gate();
        assert!(gate.try_acquire(1, 2, 0.0).await.unwrap());
        assert!(!gate.try_acquire(1, 2, 5.0).await.unwrap());
        // Measured from the grant at t=0, not the rejected attempt at t=5
        assert!(gate.try_acquire(1, 2, 10.0).await.unwrap());
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let gate = gate();
        assert!(gate.try_acquire(1, 2, 0.0).await.unwrap());
        assert!(gate.try_acquire(3, 2, 1.0).await.unwrap());
        assert!(!gate.is_eligible(1, 2, 1.0).await.unwrap());
        assert!(gate.is_eligible(1, 99, 1.0).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_eligible_does_not_consume() {
        let gate = gate();
        assert!(gate.is_eligible(1, 2, 0.0).await.unwrap());
        assert!(gate.is_eligible(1, 2, 0.0).await.unwrap());
        gate.record_grant(1, 2, 0.0).await.unwrap();
        assert!(!gate.is_eligible(1, 2, 3.0).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_attempts_grant_once() {
        let gate = Arc::new(gate());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.try_acquire(7, 8, 100.0).await.unwrap()
            }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 1);
    }
}
