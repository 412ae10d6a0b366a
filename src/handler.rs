use crate::leveling::{IntakeOutcome, MessageEvent};
use crate::Data;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

/// Gateway message hook: optional content logging, then the leveling engine.
///
/// Failures are logged here and never propagate, so one bad message cannot
/// stall the event loop.
pub async fn on_message(ctx: &serenity::Context, new_message: &serenity::Message, data: &Data) {
    let event = MessageEvent::from(new_message);
    // Filter before any storage access so ignored messages leave no trace.
    if event.author_is_bot || event.guild_id.is_none() {
        return;
    }

    if let Some(logger) = &data.message_log {
        if let Err(e) = logger.log(ctx, new_message).await {
            warn!("Failed to log message {}: {}", new_message.id, e);
        }
    }

    match data.engine.process(&event).await {
        Ok(IntakeOutcome::Granted { grant, .. }) if grant.leveled_up => {
            debug!(
                "User {} leveled up to {}, announcement dispatched",
                grant.user_id, grant.level
            );
        }
        Ok(_) => {}
        Err(e) => {
            error!(
                "Experience processing failed for user {} in guild {:?} ({}): {}",
                event.author_id,
                event.guild_id,
                e.kind(),
                e
            );
        }
    }
}
