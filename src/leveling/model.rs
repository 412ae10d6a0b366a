//! Persisted records owned by the leveling engine.

/// Level a previously unseen user starts at.
pub const DEFAULT_LEVEL: i64 = 1;
/// Experience a previously unseen user starts with.
pub const DEFAULT_XP: i64 = 10;
/// Threshold for the first level. Intentionally not the formula value for level 1.
pub const DEFAULT_LEVELUP_XP: i64 = 100;

/// Global (cross-guild) progress for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    pub user_id: u64,
    pub display_name: String,
    pub level: i64,
    pub xp: i64,
    pub levelup_xp: i64,
}

impl UserProgress {
    /// Starting state for a user the store has never seen.
    pub fn new(user_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            level: DEFAULT_LEVEL,
            xp: DEFAULT_XP,
            levelup_xp: DEFAULT_LEVELUP_XP,
        }
    }
}

/// Last time a user was granted experience in one guild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownRecord {
    pub guild_id: u64,
    pub user_id: u64,
    pub last_grant_time: f64,
}

/// A channel that receives level-up announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelUpSubscription {
    pub guild_id: u64,
    pub channel_id: u64,
}
