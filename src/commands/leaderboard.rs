use crate::leveling::model::UserProgress;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Discord caps embed field values at 1024 characters.
const EMBED_FIELD_LIMIT: usize = 1024;

/// Shows the top users by Level.
#[poise::command(slash_command)]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let limit = ctx.data().config.leaderboard_size;
    let users = ctx.data().engine.leaderboard(limit).await?;

    if users.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("No users found in the leaderboard.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let embed = serenity::CreateEmbed::new()
        .title(format!("🏆 Top {} Leaderboard", limit))
        .description(format!("Here are the top {} users by Level!", limit))
        .field("Rankings", format_rankings(&users), false)
        .color(0xF1C40F);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// One line per user; stops early rather than exceed the field limit.
pub fn format_rankings(users: &[UserProgress]) -> String {
    let mut text = String::new();
    for (idx, user) in users.iter().enumerate() {
        let line = format!(
            "**{}.** `{}` | **Level:** {}\n",
            idx + 1,
            user.display_name.replace('`', "'"),
            user.level
        );
        if text.chars().count() + line.chars().count() > EMBED_FIELD_LIMIT {
            break;
        }
        text.push_str(&line);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str, level: i64) -> UserProgress {
        let mut u = UserProgress::new(id, name);
        u.level = level;
        u
    }

    #[test]
    fn test_format_rankings() {
        let text = format_rankings(&[user(1, "alice", 5), user(2, "bo`b", 3)]);
        assert_eq!(
            text,
            "**1.** `alice` | **Level:** 5\n**2.** `bo'b` | **Level:** 3\n"
        );
    }

    #[test]
    fn test_format_rankings_fits_embed_field() {
        let long_name = "x".repeat(100);
        let users: Vec<UserProgress> = (0..25).map(|i| user(i, &long_name, 1)).collect();
        let text = format_rankings(&users);
        assert!(text.chars().count() <= EMBED_FIELD_LIMIT);
        assert!(text.starts_with("**1.**"));
    }
}
