//! Experience accrual and the level-up state machine.

use std::sync::Arc;

use tracing::{debug, info};

use super::keyed::KeyedLocks;
use super::model::UserProgress;
use crate::error::LevelError;
use crate::store::LevelStore;

/// Experience needed to finish `level`: `50·level² + 100·level + 50`.
pub fn levelup_threshold(level: i64) -> i64 {
    50 * level * level + 100 * level + 50
}

/// Result of one experience grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOutcome {
    pub user_id: u64,
    pub level: i64,
    pub xp: i64,
    pub levelup_xp: i64,
    pub leveled_up: bool,
}

/// Add `amount` to `progress`, applying at most one level-up.
///
/// Overflow past the old threshold carries into the new level. A grant large
/// enough to cross the next threshold as well still advances a single level.
pub fn apply_grant(progress: &mut UserProgress, amount: i64) -> bool {
    progress.xp += amount;
    if progress.xp < progress.levelup_xp {
        return false;
    }

    progress.xp -= progress.levelup_xp;
    progress.level += 1;
    progress.levelup_xp = levelup_threshold(progress.level);
    true
}

pub struct Progression {
    store: Arc<dyn LevelStore>,
    locks: KeyedLocks<u64>,
}

impl Progression {
    pub fn new(store: Arc<dyn LevelStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Read, update and persist one user's progress. Serialized per `user_id`.
    pub async fn grant_experience(
        &self,
        user_id: u64,
        display_name: &str,
        amount: i64,
    ) -> Result<GrantOutcome, LevelError> {
        if amount < 0 {
            return Err(LevelError::InvalidAmount(amount));
        }

        let _guard = self.locks.lock(user_id).await;

        let mut progress = match self.store.get_user(user_id).await? {
            Some(existing) => existing,
            None => {
                debug!("First grant for user {}, starting from defaults", user_id);
                UserProgress::new(user_id, display_name)
            }
        };
        progress.display_name = display_name.to_string();

        let leveled_up = apply_grant(&mut progress, amount);
        self.store.upsert_user(&progress).await?;

        if leveled_up {
            info!("User {} reached level {}", user_id, progress.level);
        }

        Ok(GrantOutcome {
            user_id,
            level: progress.level,
            xp: progress.xp,
            levelup_xp: progress.levelup_xp,
            leveled_up,
        })
    }
}
