use crate::{Context, Error};

async fn send_link(ctx: Context<'_>, link: Option<&str>) -> Result<(), Error> {
    let content = link.unwrap_or("❌ This link has not been configured.");
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Sends the community server invite.
#[poise::command(slash_command)]
pub async fn invite(ctx: Context<'_>) -> Result<(), Error> {
    let link = ctx.data().config.server_invite_url.clone();
    send_link(ctx, link.as_deref()).await
}

/// Sends the link to add this bot to a server.
#[poise::command(slash_command)]
pub async fn bot_invite(ctx: Context<'_>) -> Result<(), Error> {
    let link = ctx.data().config.bot_invite_url.clone();
    send_link(ctx, link.as_deref()).await
}
