use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use super::types::{RankingCriterion, SearchResult};

/// Offset-less layouts tried after RFC 3339 / RFC 2822, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // Long display form, e.g. "March 4, 2024, 09:15 PM"
    "%B %d, %Y, %I:%M %p",
    "%B %d, %Y at %I:%M %p",
];

/// Order a normalized batch by `criterion`, highest value first.
///
/// The sort is stable: records the comparator cannot tell apart keep their
/// input order. Returns a fresh vector; the input is never touched.
pub fn rank(results: &[SearchResult], criterion: RankingCriterion) -> Vec<SearchResult> {
    let ranked = match criterion {
        RankingCriterion::None => results.to_vec(),
        RankingCriterion::Voice => sort_desc_by_key(results, |r| Score::or_zero(r.voice)),
        RankingCriterion::SimilarityScore => {
            sort_desc_by_key(results, |r| Score(r.similarity_score))
        }
        RankingCriterion::RerankingScore => {
            sort_desc_by_key(results, |r| Score::or_zero(r.reranking_score))
        }
        RankingCriterion::RevisionsCount => {
            sort_desc_by_key(results, |r| r.revisions_count.unwrap_or(0))
        }
        RankingCriterion::CreatedAt => {
            sort_desc_by_key(results, |r| created_at_key(&r.created_at))
        }
    };
    debug!(criterion = %criterion, count = ranked.len(), "search results ranked");
    ranked
}

/// Keys are computed once per record, then a stable sort runs on them.
fn sort_desc_by_key<K, F>(results: &[SearchResult], key: F) -> Vec<SearchResult>
where
    K: Ord,
    F: Fn(&SearchResult) -> K,
{
    let mut keyed: Vec<(K, &SearchResult)> = results.iter().map(|r| (key(r), r)).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Totally ordered wrapper over a score. `-0.0 == 0.0`; NaN sits below every number.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl Score {
    fn or_zero(value: Option<f64>) -> Self {
        Score(value.unwrap_or(0.0))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // adding 0.0 folds -0.0 into 0.0
            (false, false) => (self.0 + 0.0).total_cmp(&(other.0 + 0.0)),
        }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

/// Ranking key for a `created_at` value.
///
/// `None` (unparseable) orders below every real instant, so a garbage date
/// can never outrank a valid one, and garbage values tie with each other.
pub fn created_at_key(value: &str) -> Option<DateTime<Utc>> {
    parse_instant(value)
}

/// Parse the date-time layouts the backend and its clients are known to emit.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
