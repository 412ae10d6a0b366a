//! Entry point from the gateway: one message in, at most one grant out.

use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::cooldown::CooldownGate;
use super::fanout::{Announcer, BroadcastScope, Fanout, FanoutReport};
use super::model::UserProgress;
use super::progression::{GrantOutcome, Progression};
use super::registry::SubscriptionRegistry;
use super::source::{Clock, RandomXp, SystemClock, XpSource};
use crate::error::{LevelError, StoreError};
use crate::store::LevelStore;

/// The parts of a chat message the engine cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub author_id: u64,
    pub author_is_bot: bool,
    pub author_display_name: String,
    pub guild_id: Option<u64>,
    pub timestamp: f64,
}

impl From<&serenity::Message> for MessageEvent {
    fn from(message: &serenity::Message) -> Self {
        Self {
            author_id: message.author.id.get(),
            author_is_bot: message.author.bot,
            author_display_name: message.author.name.clone(),
            guild_id: message.guild_id.map(|id| id.get()),
            timestamp: message.timestamp.unix_timestamp() as f64,
        }
    }
}

#[derive(Debug)]
pub enum IntakeOutcome {
    /// Bot author or no guild; nothing was read or written.
    Ignored,
    OnCooldown,
    Granted {
        grant: GrantOutcome,
        /// Detached fan-out task, present only on level-up.
        announcement: Option<JoinHandle<Option<FanoutReport>>>,
    },
}

pub struct EngineOptions {
    pub cooldown: Duration,
    pub scope: BroadcastScope,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cooldown: crate::config::DEFAULT_XP_COOLDOWN,
            scope: BroadcastScope::Global,
        }
    }
}

pub struct LevelEngine {
    store: Arc<dyn LevelStore>,
    gate: CooldownGate,
    progression: Progression,
    fanout: Arc<Fanout>,
    registry: SubscriptionRegistry,
    xp: Arc<dyn XpSource>,
    clock: Arc<dyn Clock>,
}

impl LevelEngine {
    pub fn new(
        store: Arc<dyn LevelStore>,
        announcer: Arc<dyn Announcer>,
        options: EngineOptions,
    ) -> Self {
        Self {
            gate: CooldownGate::new(store.clone(), options.cooldown),
            progression: Progression::new(store.clone()),
            fanout: Arc::new(Fanout::new(store.clone(), announcer, options.scope)),
            registry: SubscriptionRegistry::new(store.clone()),
            xp: Arc::new(RandomXp::new()),
            clock: Arc::new(SystemClock),
            store,
        }
    }

    pub fn with_xp_source(mut self, xp: Arc<dyn XpSource>) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<UserProgress>, StoreError> {
        self.store.top_users(limit).await
    }

    pub async fn tracked_users(&self) -> Result<u64, StoreError> {
        self.store.count_users().await
    }

    /// Cooldown gate, then progression, then a detached fan-out on level-up.
    ///
    /// The cooldown is committed before progression runs. If progression then
    /// fails the error is returned and the cooldown stays consumed.
    pub async fn process(&self, event: &MessageEvent) -> Result<IntakeOutcome, LevelError> {
        let Some(guild_id) = event.guild_id else {
            return Ok(IntakeOutcome::Ignored);
        };
        if event.author_is_bot {
            return Ok(IntakeOutcome::Ignored);
        }

        let now = self.clock.now();
        if !self.gate.try_acquire(guild_id, event.author_id, now).await? {
            return Ok(IntakeOutcome::OnCooldown);
        }

        let amount = self.xp.roll();
        let grant = self
            .progression
            .grant_experience(event.author_id, &event.author_display_name, amount)
            .await?;
        debug!(
            "Granted {} xp to user {} in guild {} (level {}, {}/{})",
            amount, grant.user_id, guild_id, grant.level, grant.xp, grant.levelup_xp
        );

        let announcement = grant
            .leveled_up
            .then(|| self.spawn_announcement(guild_id, grant.user_id, grant.level));

        Ok(IntakeOutcome::Granted {
            grant,
            announcement,
        })
    }

    fn spawn_announcement(
        &self,
        guild_id: u64,
        user_id: u64,
        level: i64,
    ) -> JoinHandle<Option<FanoutReport>> {
        let fanout = self.fanout.clone();
        tokio::spawn(async move {
            match fanout.announce_levelup(guild_id, user_id, level).await {
                Ok(report) => {
                    info!(
                        "Level-up announcement for user {} (level {}): {} delivered, {} failed",
                        user_id,
                        level,
                        report.delivered(),
                        report.failed()
                    );
                    Some(report)
                }
                Err(e) => {
                    error!(
                        "Could not load level-up channels for user {}: {}",
                        user_id, e
                    );
                    None
                }
            }
        })
    }
}
