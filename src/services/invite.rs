use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Permanent invite links per guild, kept for the life of the process.
///
/// A guild is filled in the first time a link is needed. Entries are never
/// invalidated, and failed attempts are not remembered so the next message
/// tries again.
#[derive(Clone, Default)]
pub struct InviteCache {
    links: Arc<Mutex<HashMap<u64, String>>>,
}

impl InviteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild_id: u64) -> Option<String> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild_id)
            .cloned()
    }

    /// Keeps the first link stored for a guild.
    pub fn insert(&self, guild_id: u64, url: String) -> String {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(guild_id)
            .or_insert(url)
            .clone()
    }

    pub async fn get_or_create(
        &self,
        ctx: &serenity::Context,
        guild_id: serenity::GuildId,
    ) -> Option<String> {
        if let Some(url) = self.get(guild_id.get()) {
            return Some(url);
        }

        let bot_id = ctx.cache.current_user().id;
        let cached_member = ctx
            .cache
            .guild(guild_id)
            .and_then(|g| g.members.get(&bot_id).cloned());
        let bot_member = match cached_member {
            Some(member) => member,
            None => match guild_id.member(ctx, bot_id).await {
                Ok(member) => member,
                Err(e) => {
                    warn!("Could not resolve bot member in guild {}: {}", guild_id, e);
                    return None;
                }
            },
        };

        let candidates = match ctx.cache.guild(guild_id) {
            Some(guild) => invite_candidates(guild.channels.values().map(|c| {
                (c.id, c.kind, c.position, guild.user_permissions_in(c, &bot_member))
            })),
            None => {
                debug!("Guild {} not cached, skipping invite creation", guild_id);
                return None;
            }
        };
        if candidates.is_empty() {
            debug!("No channel in guild {} allows creating an invite", guild_id);
            return None;
        }

        for channel_id in candidates {
            let builder = serenity::CreateInvite::new()
                .max_age(0)
                .max_uses(0)
                .unique(false);
            match channel_id.create_invite(ctx, builder).await {
                Ok(invite) => {
                    debug!("Created permanent invite for guild {}", guild_id);
                    return Some(self.insert(guild_id.get(), invite.url()));
                }
                Err(e) => {
                    debug!(
                        "Could not create invite for guild {} in channel {}: {}",
                        guild_id, channel_id, e
                    );
                }
            }
        }

        warn!("Every invite attempt failed in guild {}", guild_id);
        None
    }
}

/// Text channels where the bot may create invites, in position order.
pub fn invite_candidates(
    channels: impl IntoIterator<
        Item = (
            serenity::ChannelId,
            serenity::ChannelType,
            u16,
            serenity::Permissions,
        ),
    >,
) -> Vec<serenity::ChannelId> {
    let mut eligible: Vec<(u16, serenity::ChannelId)> = channels
        .into_iter()
        .filter(|(_, kind, _, perms)| {
            *kind == serenity::ChannelType::Text && perms.create_instant_invite()
        })
        .map(|(id, _, position, _)| (position, id))
        .collect();
    eligible.sort();
    eligible.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_link_wins() {
        let cache = InviteCache::new();
        assert!(cache.get(1).is_none());
        assert_eq!(cache.insert(1, "https://discord.gg/a".to_string()), "https://discord.gg/a");
        assert_eq!(cache.insert(1, "https://discord.gg/b".to_string()), "https://discord.gg/a");
        assert_eq!(cache.get(1).as_deref(), Some("https://discord.gg/a"));
    }

    #[test]
    fn test_invite_candidates_need_permission() {
        use super::serenity::{ChannelId, ChannelType, Permissions};

        let invite = Permissions::CREATE_INSTANT_INVITE | Permissions::SEND_MESSAGES;
        let channels = vec![
            (ChannelId::new(10), ChannelType::Text, 2, invite),
            (ChannelId::new(11), ChannelType::Text, 0, Permissions::SEND_MESSAGES),
            (ChannelId::new(12), ChannelType::Voice, 1, invite),
            (ChannelId::new(13), ChannelType::Text, 1, invite),
        ];
        assert_eq!(
            invite_candidates(channels),
            vec![ChannelId::new(13), ChannelId::new(10)]
        );
    }

    #[test]
    fn test_invite_candidates_empty_without_permission() {
        use super::serenity::{ChannelId, ChannelType, Permissions};

        let channels = (1..=30u64)
            .map(|id| (ChannelId::new(id), ChannelType::Text, id as u16, Permissions::VIEW_CHANNEL));
        assert!(invite_candidates(channels).is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let cache = InviteCache::new();
        let other = cache.clone();
        other.insert(7, "https://discord.gg/x".to_string());
        assert!(cache.get(7).is_some());
        assert!(cache.get(8).is_none());
    }
}
