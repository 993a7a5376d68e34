use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stand-in for an absent `created_at`: the earliest instant the ranking understands.
pub const EPOCH_SENTINEL: &str = "1970-01-01T00:00:00Z";

/// Record identifier as the backend sends it (UUID text, occasionally an integer point id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// A search hit exactly as decoded from the backend. Nothing is guaranteed present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub reranking_score: Option<f64>,
    #[serde(default)]
    pub voice: Option<f64>,
    #[serde(default)]
    pub revisions_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A validated search hit, safe to hand to the ranking engine.
///
/// Optional signals stay `None` when the backend omitted them; the comparator
/// decides what "missing" means so a future caller can still tell it apart
/// from an explicit zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    pub similarity_score: f64,
    pub reranking_score: Option<f64>,
    pub voice: Option<f64>,
    pub revisions_count: Option<u64>,
    /// Always populated; [`EPOCH_SENTINEL`] when the backend sent nothing.
    pub created_at: String,
}

#[cfg(test)]
impl SearchResult {
    pub fn new(id: impl Into<String>, content: impl Into<String>, similarity_score: f64) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            similarity_score,
            reranking_score: None,
            voice: None,
            revisions_count: None,
            created_at: EPOCH_SENTINEL.to_string(),
        }
    }
}

/// Field the result list is ordered by, highest first.
///
/// Also the slash-command choice list, so Discord only offers these names.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, poise::ChoiceParameter,
)]
#[serde(rename_all = "snake_case")]
pub enum RankingCriterion {
    /// Keep the backend's order.
    #[default]
    #[name = "none"]
    None,
    #[name = "voice"]
    Voice,
    #[name = "similarity_score"]
    SimilarityScore,
    #[name = "reranking_score"]
    RerankingScore,
    #[name = "revisions_count"]
    RevisionsCount,
    #[name = "created_at"]
    CreatedAt,
}

impl RankingCriterion {
    pub const ALL: [RankingCriterion; 6] = [
        RankingCriterion::None,
        RankingCriterion::Voice,
        RankingCriterion::SimilarityScore,
        RankingCriterion::RerankingScore,
        RankingCriterion::RevisionsCount,
        RankingCriterion::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingCriterion::None => "none",
            RankingCriterion::Voice => "voice",
            RankingCriterion::SimilarityScore => "similarity_score",
            RankingCriterion::RerankingScore => "reranking_score",
            RankingCriterion::RevisionsCount => "revisions_count",
            RankingCriterion::CreatedAt => "created_at",
        }
    }
}

impl fmt::Display for RankingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingCriterion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                anyhow::anyhow!(
                    "unknown ranking criterion `{}` (valid: {})",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// What the normalizer does with a record missing a required field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordPolicy {
    /// Fail the whole batch.
    #[default]
    Reject,
    /// Skip the record and keep the rest.
    Drop,
}

impl InvalidRecordPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidRecordPolicy::Reject => "reject",
            InvalidRecordPolicy::Drop => "drop",
        }
    }
}

impl FromStr for InvalidRecordPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(InvalidRecordPolicy::Reject),
            "drop" => Ok(InvalidRecordPolicy::Drop),
            other => anyhow::bail!("unknown invalid-record policy `{}` (valid: reject, drop)", other),
        }
    }
}
