/// Tables for user progress, per-guild cooldowns, level-up subscriptions and
/// the optional message log. Safe to run on every startup.
pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY,
        user_name TEXT NOT NULL,
        level INTEGER NOT NULL,
        xp INTEGER NOT NULL,
        levelup_xp INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_users_level ON users (level DESC);

    CREATE TABLE IF NOT EXISTS exp_cooldowns (
        guild_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        last_exp_time REAL NOT NULL,
        PRIMARY KEY (guild_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS level_up_channels (
        guild_id INTEGER NOT NULL,
        channel_id INTEGER NOT NULL,
        PRIMARY KEY (guild_id, channel_id)
    );

    CREATE TABLE IF NOT EXISTS message_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_id INTEGER NOT NULL,
        message_link TEXT NOT NULL,
        message_content TEXT NOT NULL,
        channel_id INTEGER NOT NULL,
        channel_link TEXT NOT NULL,
        message_author_name TEXT NOT NULL,
        message_author_id INTEGER NOT NULL,
        date_and_time_sent TEXT NOT NULL,
        guild_id INTEGER NOT NULL,
        guild_invite_link TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_message_logs_guild ON message_logs (guild_id);
";
