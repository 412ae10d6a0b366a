use crate::leveling::fanout::{Announcement, Announcer};
use async_trait::async_trait;
use serenity::all::{ChannelId, CreateAllowedMentions, CreateMessage, UserId};
use serenity::http::Http;
use std::sync::Arc;
use tracing::debug;

/// Posts level-up announcements through the Discord REST API.
pub struct HttpAnnouncer {
    http: Arc<Http>,
}

impl HttpAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Announcer for HttpAnnouncer {
    async fn deliver(&self, channel_id: u64, announcement: &Announcement) -> anyhow::Result<()> {
        if channel_id == 0 || announcement.user_id == 0 {
            anyhow::bail!("invalid id in level-up announcement");
        }

        // Ping only the user who leveled up, whatever else the text contains.
        let allowed_mentions =
            CreateAllowedMentions::new().users(vec![UserId::new(announcement.user_id)]);
        let builder = CreateMessage::new()
            .content(announcement.text())
            .allowed_mentions(allowed_mentions);

        debug!(
            "Sending level-up announcement for user {} to channel {}",
            announcement.user_id, channel_id
        );

        ChannelId::new(channel_id)
            .send_message(self.http.as_ref(), builder)
            .await?;

        Ok(())
    }
}
