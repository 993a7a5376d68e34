use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::sync::RwLock;

use crate::backend::SearchClient;
use crate::search::{InvalidRecordPolicy, RankingCriterion, SessionRegistry};

/// Search view settings (admins can modify at runtime).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub invalid_records: InvalidRecordPolicy,
    pub default_criterion: RankingCriterion,
    pub max_results: usize,
    pub dedup: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            invalid_records: InvalidRecordPolicy::Reject,
            default_criterion: RankingCriterion::None,
            max_results: 10,
            dedup: false,
        }
    }
}

impl ViewConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup("CHOIR_INVALID_RECORDS") {
            config.invalid_records = raw.parse().context("CHOIR_INVALID_RECORDS")?;
        }
        if let Some(raw) = lookup("CHOIR_DEFAULT_CRITERION") {
            config.default_criterion = raw.parse().context("CHOIR_DEFAULT_CRITERION")?;
        }
        if let Some(raw) = lookup("CHOIR_MAX_RESULTS") {
            config.max_results = raw
                .trim()
                .parse::<usize>()
                .context("CHOIR_MAX_RESULTS")?
                .max(1);
        }
        if let Some(raw) = lookup("CHOIR_DEDUP") {
            config.dedup = parse_switch(&raw).context("CHOIR_DEDUP")?;
        }
        Ok(config)
    }
}

/// Accepts on/off, true/false, yes/no, 1/0.
pub fn parse_switch(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => anyhow::bail!("expected on/off, got `{}`", other),
    }
}

pub struct AppState {
    pub search: Arc<SearchClient>,
    pub sessions: Arc<SessionRegistry>,
    pub admin_ids: HashSet<u64>,
    pub view_config: Arc<RwLock<ViewConfig>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
