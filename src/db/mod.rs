use crate::config::Config;
use crate::error::StoreError;
use crate::leveling::model::{CooldownRecord, LevelUpSubscription, UserProgress};
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub mod schema;

/// One row of the optional message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLogRecord {
    pub message_id: u64,
    pub message_link: String,
    pub message_content: String,
    pub channel_id: u64,
    pub channel_link: String,
    pub author_name: String,
    pub author_id: u64,
    pub sent_at: String,
    pub guild_id: u64,
    pub guild_invite_link: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        Self::open(&config.database_url)
    }

    pub fn open(path: &str) -> Result<Self, StoreError> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        warn!("Database: could not create {}: {}", parent.display(), e);
                    }
                }
            }
        }
        let conn = Connection::open(path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn execute_init(&self) -> Result<(), StoreError> {
        info!("Database: Initializing schema...");
        let conn = self.conn()?;
        conn.execute_batch(schema::SCHEMA)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    /// Runs a synchronous database closure on the blocking thread pool.
    pub async fn run_blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    // --- Users ---

    pub fn get_user(&self, user_id: u64) -> Result<Option<UserProgress>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT user_id, user_name, level, xp, levelup_xp FROM users WHERE user_id = ?1",
                (user_id,),
                |row| {
                    Ok(UserProgress {
                        user_id: row.get(0)?,
                        display_name: row.get(1)?,
                        level: row.get(2)?,
                        xp: row.get(3)?,
                        levelup_xp: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn upsert_user(&self, user: &UserProgress) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (user_id, user_name, level, xp, levelup_xp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                user_name = excluded.user_name,
                level = excluded.level,
                xp = excluded.xp,
                levelup_xp = excluded.levelup_xp",
            (
                user.user_id,
                &user.display_name,
                user.level,
                user.xp,
                user.levelup_xp,
            ),
        )?;
        Ok(())
    }

    /// Users ordered by level, highest first. Ties come back in storage order.
    pub fn top_users(&self, limit: usize) -> Result<Vec<UserProgress>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, user_name, level, xp, levelup_xp FROM users
             ORDER BY level DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map((limit as i64,), |row| {
            Ok(UserProgress {
                user_id: row.get(0)?,
                display_name: row.get(1)?,
                level: row.get(2)?,
                xp: row.get(3)?,
                levelup_xp: row.get(4)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn count_users(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    // --- Cooldowns ---

    pub fn get_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<CooldownRecord>, StoreError> {
        let conn = self.conn()?;
        let last: Option<f64> = conn
            .query_row(
                "SELECT last_exp_time FROM exp_cooldowns WHERE guild_id = ?1 AND user_id = ?2",
                (guild_id, user_id),
                |row| row.get(0),
            )
            .optional()?;
        Ok(last.map(|last_grant_time| CooldownRecord {
            guild_id,
            user_id,
            last_grant_time,
        }))
    }

    /// Writes the grant time for a pair. Older timestamps never overwrite newer ones.
    pub fn upsert_cooldown(&self, record: &CooldownRecord) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO exp_cooldowns (guild_id, user_id, last_exp_time)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(guild_id, user_id) DO UPDATE SET last_exp_time = excluded.last_exp_time
             WHERE excluded.last_exp_time >= exp_cooldowns.last_exp_time",
            (record.guild_id, record.user_id, record.last_grant_time),
        )?;
        Ok(())
    }

    // --- Level-up channels ---

    pub fn list_levelup_channels(&self, guild_id: u64) -> Result<Vec<u64>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT channel_id FROM level_up_channels WHERE guild_id = ?1 ORDER BY channel_id",
        )?;
        let rows = stmt.query_map((guild_id,), |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn all_levelup_channels(&self) -> Result<Vec<LevelUpSubscription>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT guild_id, channel_id FROM level_up_channels")?;
        let rows = stmt.query_map([], |row| {
            Ok(LevelUpSubscription {
                guild_id: row.get(0)?,
                channel_id: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Returns `false` when the pair is already registered.
    pub fn add_levelup_channel(&self, guild_id: u64, channel_id: u64) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        match conn.execute(
            "INSERT INTO level_up_channels (guild_id, channel_id) VALUES (?1, ?2)",
            (guild_id, channel_id),
        ) {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                debug!(
                    "Database: level-up channel {} already registered for guild {}",
                    channel_id, guild_id
                );
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    // --- Message log ---

    pub fn save_message_log(&self, record: &MessageLogRecord) -> Result<(), StoreError> {
        debug!(
            "Database: Logging message {} from user {} in channel {}",
            record.message_id, record.author_id, record.channel_id
        );
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO message_logs (message_id, message_link, message_content, channel_id,
                channel_link, message_author_name, message_author_id, date_and_time_sent,
                guild_id, guild_invite_link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            (
                record.message_id,
                &record.message_link,
                &record.message_content,
                record.channel_id,
                &record.channel_link,
                &record.author_name,
                record.author_id,
                &record.sent_at,
                record.guild_id,
                &record.guild_invite_link,
            ),
        )?;
        Ok(())
    }

    pub fn count_message_logs(&self, guild_id: u64) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM message_logs WHERE guild_id = ?1",
            (guild_id,),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
