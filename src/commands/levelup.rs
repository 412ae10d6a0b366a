use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

async fn say_ephemeral(ctx: Context<'_>, text: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(text.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Announcements need both View Channel and Send Messages.
fn can_post(permissions: serenity::Permissions) -> bool {
    permissions.view_channel() && permissions.send_messages()
}

/// Adds a channel to show when users level up.
#[poise::command(slash_command, guild_only)]
pub async fn add_levelup_channel(
    ctx: Context<'_>,
    #[description = "Channel for level-up announcements"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let cached_owner = ctx.guild().map(|g| g.owner_id);
    let owner_id = match cached_owner {
        Some(id) => id,
        None => guild_id.to_partial_guild(ctx).await?.owner_id,
    };
    if ctx.author().id != owner_id {
        return say_ephemeral(ctx, "Only the server owner can add level-up channels.").await;
    }

    if channel.guild_id != guild_id {
        return say_ephemeral(ctx, "That channel belongs to a different server.").await;
    }

    let bot_member = guild_id.member(ctx, ctx.framework().bot_id).await?;
    let cached_permissions = ctx
        .guild()
        .map(|g| g.user_permissions_in(&channel, &bot_member));
    let permissions = match cached_permissions {
        Some(p) => p,
        None => guild_id
            .to_partial_guild(ctx)
            .await?
            .user_permissions_in(&channel, &bot_member),
    };
    if !can_post(permissions) {
        return say_ephemeral(ctx, "I don't have permission to access that channel.").await;
    }

    let added = ctx
        .data()
        .engine
        .registry()
        .add_channel(guild_id.get(), channel.id.get())
        .await?;

    if added {
        info!(
            "Owner {} added level-up channel {} in guild {}",
            ctx.author().id,
            channel.id,
            guild_id
        );
        say_ephemeral(
            ctx,
            format!("Channel <#{}> has been added as a level-up channel.", channel.id),
        )
        .await
    } else {
        say_ephemeral(ctx, "This channel is already set as a level-up channel.").await
    }
}

/// Lists this server's level-up channels.
#[poise::command(slash_command, guild_only)]
pub async fn levelup_channels(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let channels = ctx
        .data()
        .engine
        .registry()
        .list_channels(guild_id.get())
        .await?;

    if channels.is_empty() {
        return say_ephemeral(ctx, "📭 No level-up channels configured for this server.").await;
    }

    let lines: Vec<String> = channels.iter().map(|id| format!("• <#{}>", id)).collect();
    say_ephemeral(ctx, format!("**Level-up channels:**\n{}", lines.join("\n"))).await
}
