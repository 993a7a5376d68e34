use crate::search::{InvalidRecordPolicy, RankingCriterion};
use crate::state::{parse_switch, Context};

/// Configure the search view (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "invalid_records | default_criterion | max_results | dedup"] param: Option<String>,
    #[description = "New value"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    match (param.as_deref(), value) {
        // Show current config
        (None, _) => {
            let config = ctx.data().view_config.read().await;
            ctx.say(format!(
                "**Search Configuration:**\n\
                 `invalid_records`: {}\n\
                 `default_criterion`: {}\n\
                 `max_results`: {}\n\
                 `dedup`: {}",
                config.invalid_records.as_str(),
                config.default_criterion,
                config.max_results,
                if config.dedup { "on" } else { "off" }
            ))
            .await?;
        }
        // Set a parameter
        (Some(key), Some(val)) => {
            let mut config = ctx.data().view_config.write().await;
            let outcome = match key {
                "invalid_records" => val
                    .parse::<InvalidRecordPolicy>()
                    .map(|p| config.invalid_records = p),
                "default_criterion" => val
                    .parse::<RankingCriterion>()
                    .map(|c| config.default_criterion = c),
                "max_results" => val
                    .trim()
                    .parse::<usize>()
                    .map_err(anyhow::Error::from)
                    .map(|n| config.max_results = n.max(1)),
                "dedup" => parse_switch(&val).map(|on| config.dedup = on),
                _ => {
                    ctx.say(format!(
                        "Unknown param `{}`. Valid: `invalid_records`, `default_criterion`, `max_results`, `dedup`",
                        key
                    ))
                    .await?;
                    return Ok(());
                }
            };
            drop(config);
            match outcome {
                Ok(()) => ctx.say(format!("`{}` set to {}", key, val.trim())).await?,
                Err(e) => ctx.say(format!("Invalid value for `{}`: {}", key, e)).await?,
            };
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/choir config max_results 20`")
                .await?;
        }
    }

    Ok(())
}
