//! Best-effort level-up announcements to subscribed channels.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::LevelStore;

/// Which subscriptions hear about a level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastScope {
    /// Every registered channel in every guild.
    #[default]
    Global,
    /// Only channels registered by the guild the message came from.
    Guild,
}

impl FromStr for BroadcastScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" | "all" => Ok(BroadcastScope::Global),
            "guild" | "local" => Ok(BroadcastScope::Guild),
            other => Err(format!("unknown broadcast scope '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub user_id: u64,
    pub level: i64,
}

impl Announcement {
    pub fn text(&self) -> String {
        format!("<@{}> leveled up to level {}! 🎉", self.user_id, self.level)
    }
}

/// Resolves a channel and posts an announcement to it.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn deliver(&self, channel_id: u64, announcement: &Announcement) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub guild_id: u64,
    pub channel_id: u64,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    pub user_id: u64,
    pub level: i64,
    pub deliveries: Vec<Delivery>,
}

impl FanoutReport {
    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Delivered)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.delivered()
    }
}

pub struct Fanout {
    store: Arc<dyn LevelStore>,
    announcer: Arc<dyn Announcer>,
    scope: BroadcastScope,
}

impl Fanout {
    pub fn new(
        store: Arc<dyn LevelStore>,
        announcer: Arc<dyn Announcer>,
        scope: BroadcastScope,
    ) -> Self {
        Self {
            store,
            announcer,
            scope,
        }
    }

    pub fn scope(&self) -> BroadcastScope {
        self.scope
    }

    /// Send the announcement to every subscription in scope.
    ///
    /// Only reading the subscription list can fail; individual deliveries
    /// are recorded in the report and never abort the loop.
    pub async fn announce_levelup(
        &self,
        origin_guild: u64,
        user_id: u64,
        level: i64,
    ) -> Result<FanoutReport, StoreError> {
        let mut targets = self.store.all_subscriptions().await?;
        if self.scope == BroadcastScope::Guild {
            targets.retain(|s| s.guild_id == origin_guild);
        }

        let announcement = Announcement { user_id, level };
        let mut deliveries = Vec::with_capacity(targets.len());
        for target in targets {
            let status = match self.announcer.deliver(target.channel_id, &announcement).await {
                Ok(()) => {
                    debug!(
                        "Announced level {} for user {} in channel {}",
                        level, user_id, target.channel_id
                    );
                    DeliveryStatus::Delivered
                }
                Err(e) => {
                    warn!(
                        "Failed to send level up message in guild {}, channel {}: {}",
                        target.guild_id, target.channel_id, e
                    );
                    DeliveryStatus::Failed(e.to_string())
                }
            };
            deliveries.push(Delivery {
                guild_id: target.guild_id,
                channel_id: target.channel_id,
                status,
            });
        }

        Ok(FanoutReport {
            user_id,
            level,
            deliveries,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingAnnouncer;
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_subscription(1, 100).await.unwrap();
        store.insert_subscription(1, 101).await.unwrap();
        store.insert_subscription(2, 200).await.unwrap();
        store
    }

    #[test]
    fn test_announcement_text() {
        let text = Announcement { user_id: 42, level: 3 }.text();
        assert_eq!(text, "<@42> leveled up to level 3! 🎉");
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("GLOBAL".parse::<BroadcastScope>(), Ok(BroadcastScope::Global));
        assert_eq!(" guild ".parse::<BroadcastScope>(), Ok(BroadcastScope::Guild));
        assert!("nowhere".parse::<BroadcastScope>().is_err());
    }

    #[tokio::test]
    async fn test_global_scope_reaches_every_guild() {
        let store = seeded_store().await;
        let announcer = Arc::new(RecordingAnnouncer::default());
        let fanout = Fanout::new(store, announcer.clone(), BroadcastScope::Global);

        let report = fanout.announce_levelup(1, 42, 2).await.unwrap();
        assert_eq!(report.delivered(), 3);
        let mut channels: Vec<u64> = announcer.sent().into_iter().map(|(c, _)| c).collect();
        channels.sort();
        assert_eq!(channels, vec![100, 101, 200]);
    }

    #[tokio::test]
    async fn test_guild_scope_stays_local() {
        let store = seeded_store().await;
        let announcer = Arc::new(RecordingAnnouncer::default());
        let fanout = Fanout::new(store, announcer.clone(), BroadcastScope::Guild);

        let report = fanout.announce_levelup(2, 42, 2).await.unwrap();
        assert_eq!(report.deliveries.len(), 1);
        assert_eq!(announcer.sent(), vec![(200, "<@42> leveled up to level 2! 🎉".to_string())]);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_fanout() {
        let store = seeded_store().await;
        let announcer = Arc::new(RecordingAnnouncer::failing(&[100]));
        let fanout = Fanout::new(store, announcer.clone(), BroadcastScope::Global);

        let report = fanout.announce_levelup(1, 7, 5).await.unwrap();
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 1);
        let failed = report
            .deliveries
            .iter()
            .find(|d| d.channel_id == 100)
            .unwrap();
        assert!(matches!(&failed.status, DeliveryStatus::Failed(reason) if reason.contains("Unknown Channel")));
    }

    #[tokio::test]
    async fn test_same_channel_under_two_guilds_is_sent_twice() {
        let store = Arc::new(MemoryStore::new());
        store.insert_subscription(1, 500).await.unwrap();
        store.insert_subscription(2, 500).await.unwrap();
        let announcer = Arc::new(RecordingAnnouncer::default());
        let fanout = Fanout::new(store, announcer.clone(), BroadcastScope::Global);

        fanout.announce_levelup(1, 1, 2).await.unwrap();
        assert_eq!(announcer.sent().len(), 2);
    }
}
