use crate::state::Context;

/// Forget your current search results
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let had_session = ctx.data().sessions.clear(ctx.author().id.get()).await;
    if had_session {
        ctx.say("Search results cleared.").await?;
    } else {
        ctx.say("No search results to clear.").await?;
    }
    Ok(())
}
