use levelbot::commands::{admin, leaderboard, levelup, links};
use levelbot::db::Database;
use levelbot::leveling::{EngineOptions, LevelEngine};
use levelbot::services::announcer::HttpAnnouncer;
use levelbot::services::invite::InviteCache;
use levelbot::services::message_log::MessageLogger;
use levelbot::store::LevelStore;
use levelbot::{config::Config, handler, status, Data};
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);
    let discord_token = config.discord_token.clone();

    // Open storage before connecting so a bad path fails fast
    let db = Database::new(&config)?;
    db.execute_init()?;

    let owners: HashSet<serenity::UserId> = config
        .owner_id
        .filter(|id| *id != 0)
        .map(serenity::UserId::new)
        .into_iter()
        .collect();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                leaderboard::leaderboard(),
                levelup::add_levelup_channel(),
                levelup::levelup_channels(),
                links::invite(),
                links::bot_invite(),
                admin::sync(),
            ],
            owners,
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        handler::on_message(ctx, new_message, data).await;
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}, have fun with the leveling :)", ready.user.name);

                if config.register_commands {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!(
                        "Synced {} command(s) with Discord.",
                        framework.options().commands.len()
                    );
                }

                let store: Arc<dyn LevelStore> = Arc::new(db.clone());
                let announcer = Arc::new(HttpAnnouncer::new(ctx.http.clone()));
                let engine = Arc::new(LevelEngine::new(
                    store,
                    announcer,
                    EngineOptions {
                        cooldown: config.xp_cooldown,
                        scope: config.levelup_broadcast,
                    },
                ));

                tokio::spawn(status::rotate_status(
                    ctx.clone(),
                    engine.clone(),
                    Duration::from_secs(config.status_rotation_secs),
                ));

                let message_log = config.message_logging_enabled.then(|| {
                    MessageLogger::new(
                        db.clone(),
                        InviteCache::new(),
                        config.message_log_utc_offset_hours,
                    )
                });

                Ok(Data {
                    config,
                    db,
                    engine,
                    message_log,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
