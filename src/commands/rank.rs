use tracing::info;

use super::send_chunked;
use crate::search::display::render_results;
use crate::search::RankingCriterion;
use crate::state::Context;

/// Re-order your last search results (no new search)
#[poise::command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "Field to order by, highest first"] criterion: RankingCriterion,
) -> Result<(), anyhow::Error> {
    let user = ctx.author().id.get();
    let Some(ranked) = ctx.data().sessions.rerank(user, criterion).await else {
        ctx.say("Nothing to rank yet. Run `/choir search` first.").await?;
        return Ok(());
    };

    info!(user = ctx.author().name, criterion = %criterion, count = ranked.len(), "Results re-ranked");

    let max_results = ctx.data().view_config.read().await.max_results;
    send_chunked(&ctx, &render_results(None, &ranked, criterion, max_results)).await
}
