//! Discord text rendering for a ranked result list.

use super::rank::parse_instant;
use super::types::{RankingCriterion, SearchResult, EPOCH_SENTINEL};

/// Discord rejects messages over 2000 chars; leave headroom.
pub const MAX_CHUNK: usize = 1990;

const MAX_CONTENT_CHARS: usize = 400;

/// Long human form, e.g. "March 4, 2024, 09:15 PM". Raw text if it does not parse.
pub fn format_created_at(created_at: &str) -> Option<String> {
    if created_at == EPOCH_SENTINEL {
        return None;
    }
    Some(match parse_instant(created_at) {
        Some(instant) => instant.format("%B %-d, %Y, %I:%M %p").to_string(),
        None => created_at.to_string(),
    })
}

fn shown(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// One list entry. Absent and zero-valued signals are left out.
pub fn format_result(position: usize, result: &SearchResult) -> String {
    let content: String = if result.content.chars().count() > MAX_CONTENT_CHARS {
        let cut: String = result.content.chars().take(MAX_CONTENT_CHARS).collect();
        format!("{}…", cut.trim_end())
    } else {
        result.content.clone()
    };

    let mut out = format!("**{}.** {}\n", position, content);

    let mut details = Vec::new();
    if let Some(created) = format_created_at(&result.created_at) {
        details.push(format!("Created At: {}", created));
    }
    if let Some(voice) = shown(result.voice) {
        details.push(format!("Voice: {}", voice));
    }
    if let Some(score) = shown(Some(result.similarity_score)) {
        details.push(format!("Similarity Score: {}", score));
    }
    if let Some(score) = shown(result.reranking_score) {
        details.push(format!("Reranking Score: {}", score));
    }
    if let Some(count) = result.revisions_count.filter(|c| *c != 0) {
        details.push(format!("Revisions Count: {}", count));
    }
    if !details.is_empty() {
        out.push_str(&format!("-# {}\n", details.join(" | ")));
    }
    out
}

/// Full reply body: a header line plus at most `limit` entries.
pub fn render_results(
    query: Option<&str>,
    results: &[SearchResult],
    criterion: RankingCriterion,
    limit: usize,
) -> String {
    if results.is_empty() {
        return "No messages found.".to_string();
    }

    let mut out = match query {
        Some(q) => format!("**Search:** {}\n", q),
        None => String::new(),
    };
    out.push_str(&format!(
        "**Results:** {} | **Ranked by:** `{}`\n\n",
        results.len(),
        criterion
    ));

    for (i, result) in results.iter().take(limit).enumerate() {
        out.push_str(&format_result(i + 1, result));
        out.push('\n');
    }

    if results.len() > limit {
        out.push_str(&format!("_…and {} more_\n", results.len() - limit));
    }
    out
}

/// Split `text` into pieces of at most [`MAX_CHUNK`] bytes, preferring newline
/// then space boundaries, never splitting inside a UTF-8 sequence.
pub fn chunk_message(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(MAX_CHUNK);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_created_at() {
        assert_eq!(
            format_created_at("2024-03-04T21:15:00Z").as_deref(),
            Some("March 4, 2024, 09:15 PM")
        );
        assert_eq!(format_created_at(EPOCH_SENTINEL), None);
        assert_eq!(format_created_at("sometime").as_deref(), Some("sometime"));
    }

    #[test]
    fn test_format_result_hides_absent_and_zero_signals() {
        let mut result = SearchResult::new("a", "hello", 0.25);
        result.voice = Some(0.0);
        result.revisions_count = Some(2);
        let out = format_result(1, &result);
        assert!(out.starts_with("**1.** hello\n"));
        assert!(out.contains("Similarity Score: 0.25"));
        assert!(out.contains("Revisions Count: 2"));
        assert!(!out.contains("Voice"));
        assert!(!out.contains("Reranking"));
        assert!(!out.contains("Created At"));
    }

    #[test]
    fn test_format_result_truncates_long_content() {
        let result = SearchResult::new("a", "é".repeat(1000), 0.1);
        let out = format_result(1, &result);
        assert!(out.contains('…'));
        assert!(out.chars().count() < 600);
    }

    #[test]
    fn test_render_results_caps_entries() {
        let results: Vec<SearchResult> = (0..5)
            .map(|i| SearchResult::new(i.to_string(), format!("item {}", i), 0.1))
            .collect();
        let out = render_results(Some("q"), &results, RankingCriterion::SimilarityScore, 2);
        assert!(out.contains("**Search:** q"));
        assert!(out.contains("`similarity_score`"));
        assert!(out.contains("item 1"));
        assert!(!out.contains("item 2"));
        assert!(out.contains("and 3 more"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            render_results(None, &[], RankingCriterion::None, 10),
            "No messages found."
        );
    }

    #[test]
    fn test_chunk_message_splits_on_newlines() {
        let line = format!("{}\n", "x".repeat(99));
        let text = line.repeat(50);
        let chunks = chunk_message(&text);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.len() <= MAX_CHUNK && c.ends_with('\n')));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_message_respects_char_boundaries() {
        let text = "é".repeat(2000);
        let chunks = chunk_message(&text);
        assert!(chunks.iter().all(|c| c.len() <= MAX_CHUNK));
        assert_eq!(chunks.concat(), text);
    }
}
