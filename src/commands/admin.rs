use crate::{Context, Error};
use tracing::info;

/// Syncs the bot's commands with Discord (Owner only)
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn sync(ctx: Context<'_>) -> Result<(), Error> {
    info!("Sync command received from owner: {}", ctx.author().name);
    let commands = &ctx.framework().options().commands;
    poise::builtins::register_globally(ctx.http(), commands).await?;
    ctx.send(
        poise::CreateReply::default()
            .content(format!("Synced {} command(s) with Discord.", commands.len()))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
