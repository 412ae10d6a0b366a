use crate::error::StoreError;
use crate::leveling::LevelEngine;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

/// Alternates the bot presence between the server count and the number of
/// users with recorded progress.
pub async fn rotate_status(ctx: serenity::Context, engine: Arc<LevelEngine>, period: Duration) {
    info!("Starting status rotation every {:?}", period);
    let mut ticker = interval(period.max(Duration::from_secs(1)));
    let mut show_users = false;

    loop {
        ticker.tick().await;
        let label = if show_users {
            users_label(engine.tracked_users().await)
        } else {
            servers_label(ctx.cache.guild_count())
        };
        ctx.set_activity(Some(serenity::ActivityData::watching(label)));
        show_users = !show_users;
    }
}

pub fn servers_label(count: usize) -> String {
    format!("{} servers", count)
}

pub fn users_label(count: Result<u64, StoreError>) -> String {
    match count {
        Ok(n) => format!("{} users", n),
        Err(e) => {
            warn!("Could not count users for status: {}", e);
            "? users".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(servers_label(3), "3 servers");
        assert_eq!(users_label(Ok(120)), "120 users");
        assert_eq!(users_label(Err(StoreError::Poisoned)), "? users");
    }
}
