use crate::db::{Database, MessageLogRecord};
use crate::services::invite::InviteCache;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use poise::serenity_prelude as serenity;

pub const NO_INVITE: &str = "No invite available";

/// Persists message content for guild messages. Only built when logging is enabled.
pub struct MessageLogger {
    db: Database,
    invites: InviteCache,
    offset: FixedOffset,
}

impl MessageLogger {
    pub fn new(db: Database, invites: InviteCache, utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or(Utc.fix());
        Self {
            db,
            invites,
            offset,
        }
    }

    pub async fn log(
        &self,
        ctx: &serenity::Context,
        message: &serenity::Message,
    ) -> anyhow::Result<()> {
        let Some(guild_id) = message.guild_id else {
            return Ok(());
        };

        let invite = self
            .invites
            .get_or_create(ctx, guild_id)
            .await
            .unwrap_or_else(|| NO_INVITE.to_string());

        let attachments: Vec<String> = message.attachments.iter().map(|a| a.url.clone()).collect();
        let guild = guild_id.get();
        let channel = message.channel_id.get();

        let record = MessageLogRecord {
            message_id: message.id.get(),
            message_link: message_link(guild, channel, message.id.get()),
            message_content: content_with_attachments(&message.content, &attachments),
            channel_id: channel,
            channel_link: channel_link(guild, channel),
            author_name: message.author.tag(),
            author_id: message.author.id.get(),
            sent_at: format_sent_at(message.timestamp.unix_timestamp(), self.offset),
            guild_id: guild,
            guild_invite_link: invite,
        };

        self.db
            .run_blocking(move |db| db.save_message_log(&record))
            .await?;
        Ok(())
    }
}

pub fn message_link(guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!(
        "https://discord.com/channels/{}/{}/{}",
        guild_id, channel_id, message_id
    )
}

pub fn channel_link(guild_id: u64, channel_id: u64) -> String {
    format!("https://discord.com/channels/{}/{}", guild_id, channel_id)
}

/// Message text followed by attachment URLs, space separated.
pub fn content_with_attachments(content: &str, attachment_urls: &[String]) -> String {
    let mut text = content.to_string();
    if !attachment_urls.is_empty() {
        text.push(' ');
        text.push_str(&attachment_urls.join(" "));
    }
    text.trim().to_string()
}

pub fn format_sent_at(unix_secs: i64, offset: FixedOffset) -> String {
    DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        assert_eq!(
            message_link(1, 2, 3),
            "https://discord.com/channels/1/2/3"
        );
        assert_eq!(channel_link(1, 2), "https://discord.com/channels/1/2");
    }

    #[test]
    fn test_content_with_attachments() {
        assert_eq!(content_with_attachments("hi", &[]), "hi");
        let urls = vec![
            "https://cdn.example/a.png".to_string(),
            "https://cdn.example/b.mp4".to_string(),
        ];
        assert_eq!(
            content_with_attachments("look", &urls),
            "look https://cdn.example/a.png https://cdn.example/b.mp4"
        );
        // Attachment-only messages have no leading space
        assert_eq!(
            content_with_attachments("", &urls[..1]),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn test_format_sent_at_uses_offset() {
        let perth = FixedOffset::east_opt(8 * 3600).unwrap();
        // 2024-01-01 00:00:00 UTC
        assert_eq!(format_sent_at(1_704_067_200, perth), "2024-01-01 08:00:00");
        assert_eq!(format_sent_at(1_704_067_200, Utc.fix()), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_bad_offset_falls_back_to_utc() {
        let logger = MessageLogger::new(
            Database::open(":memory:").unwrap(),
            InviteCache::new(),
            48,
        );
        assert_eq!(logger.offset, Utc.fix());
    }
}
