use crate::leveling::fanout::BroadcastScope;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub owner_id: Option<u64>,
    pub database_url: String,
    pub register_commands: bool,

    // Leveling
    pub xp_cooldown: Duration,
    pub levelup_broadcast: BroadcastScope,
    pub leaderboard_size: usize,

    // Message logging
    pub message_logging_enabled: bool,
    pub message_log_utc_offset_hours: i32,

    // Presence & links
    pub status_rotation_secs: u64,
    pub server_invite_url: Option<String>,
    pub bot_invite_url: Option<String>,
}

pub const DEFAULT_XP_COOLDOWN: Duration = Duration::from_secs(10);

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            owner_id: env::var("OWNER_ID").ok().and_then(|id| id.parse().ok()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/levelbot.db".to_string()),
            register_commands: env::var("REGISTER_COMMANDS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            xp_cooldown: env::var("XP_COOLDOWN")
                .ok()
                .and_then(|v| humantime::parse_duration(v.trim()).ok())
                .unwrap_or(DEFAULT_XP_COOLDOWN),
            levelup_broadcast: env::var("LEVELUP_BROADCAST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            leaderboard_size: env::var("LEADERBOARD_SIZE")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .unwrap_or(25),
            message_logging_enabled: env::var("MESSAGE_LOGGING_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            message_log_utc_offset_hours: env::var("MESSAGE_LOG_UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8),
            status_rotation_secs: env::var("STATUS_ROTATION_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            server_invite_url: env::var("SERVER_INVITE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            bot_invite_url: env::var("BOT_INVITE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .field("database_url", &self.database_url)
            .field("register_commands", &self.register_commands)
            .field("xp_cooldown", &self.xp_cooldown)
            .field("levelup_broadcast", &self.levelup_broadcast)
            .field("leaderboard_size", &self.leaderboard_size)
            .field("message_logging_enabled", &self.message_logging_enabled)
            .field(
                "message_log_utc_offset_hours",
                &self.message_log_utc_offset_hours,
            )
            .field("status_rotation_secs", &self.status_rotation_secs)
            .field("server_invite_url", &self.server_invite_url)
            .field("bot_invite_url", &self.bot_invite_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Missing token
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when DISCORD_TOKEN is missing");

        // 2. Defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::remove_var("XP_COOLDOWN");
        env::remove_var("LEVELUP_BROADCAST");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.xp_cooldown, Duration::from_secs(10));
        assert_eq!(config.levelup_broadcast, BroadcastScope::Global);
        assert_eq!(config.leaderboard_size, 25);
        assert!(!config.message_logging_enabled);

        // 3. Overrides
        env::set_var("XP_COOLDOWN", "1m 30s");
        env::set_var("LEVELUP_BROADCAST", "guild");
        let config = Config::build().unwrap();
        assert_eq!(config.xp_cooldown, Duration::from_secs(90));
        assert_eq!(config.levelup_broadcast, BroadcastScope::Guild);

        // 4. Garbage falls back to defaults
        env::set_var("XP_COOLDOWN", "soon");
        env::set_var("LEVELUP_BROADCAST", "everywhere");
        let config = Config::build().unwrap();
        assert_eq!(config.xp_cooldown, DEFAULT_XP_COOLDOWN);
        assert_eq!(config.levelup_broadcast, BroadcastScope::Global);

        // 5. Debug redaction
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("XP_COOLDOWN");
        env::remove_var("LEVELUP_BROADCAST");
    }
}
