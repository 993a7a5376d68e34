mod clear;
mod config;
mod rank;
mod search;

use crate::search::display::chunk_message;
use crate::state::Context;

/// Choir - search the thought space and rank what comes back
#[poise::command(
    slash_command,
    subcommands("search::search", "rank::rank", "clear::clear", "config::config")
)]
pub async fn choir(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Send a reply in Discord-safe chunks.
/// Uses ctx.say() for every chunk so follow-ups go through the interaction
/// webhook (no Send Messages channel permission required).
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in chunk_message(text) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
