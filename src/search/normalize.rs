use std::collections::HashMap;

use tracing::{debug, warn};

use super::rank::created_at_key;
use super::types::{InvalidRecordPolicy, RawSearchResult, SearchResult, EPOCH_SENTINEL};
use crate::error::{Result, SearchError};

/// Validate a raw backend batch and fill in the defaults the comparator relies on.
///
/// Only `created_at` is defaulted (to [`EPOCH_SENTINEL`]); every other optional
/// signal keeps its absence. Output order matches input order.
pub fn normalize(raw: Vec<RawSearchResult>, policy: InvalidRecordPolicy) -> Result<Vec<SearchResult>> {
    let total = raw.len();
    let mut results = Vec::with_capacity(total);

    for (index, record) in raw.into_iter().enumerate() {
        match normalize_record(record) {
            Ok(result) => results.push(result),
            Err(field) => match policy {
                InvalidRecordPolicy::Reject => {
                    return Err(SearchError::Validation { index, field });
                }
                InvalidRecordPolicy::Drop => {
                    warn!(index, field, "dropping search result with missing field");
                }
            },
        }
    }

    debug!(total, kept = results.len(), "search batch normalized");
    Ok(results)
}

/// Returns the name of the first missing required field on failure.
fn normalize_record(record: RawSearchResult) -> std::result::Result<SearchResult, &'static str> {
    let id = record.id.ok_or("id")?.into_string();
    let content = record.content.ok_or("content")?;
    let similarity_score = record.similarity_score.ok_or("similarity_score")?;

    let created_at = match record.created_at {
        Some(s) if !s.trim().is_empty() => s,
        _ => EPOCH_SENTINEL.to_string(),
    };

    Ok(SearchResult {
        id,
        content,
        similarity_score,
        reranking_score: record.reranking_score,
        voice: record.voice,
        revisions_count: record.revisions_count,
        created_at,
    })
}

/// Collapse results whose content matches after trimming and lowercasing.
///
/// The earliest-created record of each group survives (input position breaks
/// ties, unparseable dates lose); survivors keep their input order.
pub fn dedup_by_content(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let before = results.len();
    // content key -> (created_at key, index of current survivor)
    let mut keepers: HashMap<String, (Option<chrono::DateTime<chrono::Utc>>, usize)> =
        HashMap::new();

    for (index, result) in results.iter().enumerate() {
        let key = result.content.trim().to_lowercase();
        let created = created_at_key(&result.created_at);
        keepers
            .entry(key)
            .and_modify(|(best, best_index)| {
                let earlier = match (created, *best) {
                    (Some(new), Some(old)) => new < old,
                    (Some(_), None) => true,
                    _ => false,
                };
                if earlier {
                    *best = created;
                    *best_index = index;
                }
            })
            .or_insert((created, index));
    }

    let mut survivors: Vec<usize> = keepers.into_values().map(|(_, i)| i).collect();
    survivors.sort_unstable();

    let mut survivors = survivors.into_iter().peekable();
    let deduped: Vec<SearchResult> = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| {
            if survivors.peek() == Some(&index) {
                survivors.next();
                Some(result)
            } else {
                None
            }
        })
        .collect();

    if deduped.len() != before {
        debug!(before, after = deduped.len(), "duplicate search results removed");
    }
    deduped
}
