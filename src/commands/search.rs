use tracing::{info, warn};

use super::send_chunked;
use crate::search::display::render_results;
use crate::search::session::InstallOutcome;
use crate::search::{dedup_by_content, normalize, RankingCriterion};
use crate::state::Context;

/// Search messages and show them ranked
#[poise::command(slash_command, guild_only)]
pub async fn search(
    ctx: Context<'_>,
    #[description = "What to search for"] query: String,
    #[description = "Order results by (defaults to your last choice)"] criterion: Option<
        RankingCriterion,
    >,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let user = ctx.author().id.get();
    let config = ctx.data().view_config.read().await.clone();
    let sessions = &ctx.data().sessions;

    let (ticket, session_criterion) = sessions.begin_query(user, config.default_criterion).await;

    info!(
        user = ctx.author().name,
        query,
        criterion = %criterion.unwrap_or(session_criterion),
        "Search started"
    );

    let raw = match ctx.data().search.search(&query).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Search request failed");
            ctx.say(format!("Error: {}", e)).await?;
            return Ok(());
        }
    };

    let mut batch = match normalize(raw, config.invalid_records) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "Search response rejected");
            ctx.say(format!("Error: {}", e)).await?;
            return Ok(());
        }
    };
    if config.dedup {
        batch = dedup_by_content(batch);
    }

    let (ranked, ranked_by) = match sessions.install(user, ticket, batch, criterion).await {
        InstallOutcome::Installed { ranked, criterion } => (ranked, criterion),
        InstallOutcome::Superseded => {
            ctx.say("A newer search replaced this one.").await?;
            return Ok(());
        }
        InstallOutcome::Cleared => {
            ctx.say("Search results were cleared while this search ran.")
                .await?;
            return Ok(());
        }
    };

    info!(count = ranked.len(), criterion = %ranked_by, "Search complete");

    let body = render_results(Some(&query), &ranked, ranked_by, config.max_results);
    send_chunked(&ctx, &body).await
}
