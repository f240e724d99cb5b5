use serde::Serialize;

use crate::store::Preferences;

/// Hex chars kept from the BLAKE3 digest
pub const FINGERPRINT_LEN: usize = 16;

#[derive(Serialize)]
struct CanonicalPreferences<'a> {
    avoid_topics: Vec<String>,
    freshness_priority: &'a str,
    insight_style: &'a str,
    topics_of_interest: Vec<String>,
}

/// Trimmed, lowercased, sorted and de-duplicated topics.
///
/// Scoring reads topics through this view too, so one fingerprint means one result.
pub fn normalize_topics(topics: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = topics
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Stable identifier for a preferences record.
///
/// Topic order, case and duplicates do not matter; any other change does.
pub fn fingerprint(preferences: &Preferences) -> String {
    let canonical = CanonicalPreferences {
        avoid_topics: normalize_topics(&preferences.avoid_topics),
        freshness_priority: preferences.freshness_priority.as_str(),
        insight_style: &preferences.insight_style,
        topics_of_interest: normalize_topics(&preferences.topics_of_interest),
    };
    let bytes = serde_json::to_vec(&canonical).unwrap_or_else(|_| format!("{:?}", preferences).into_bytes());

    let hash = blake3::hash(&bytes).to_hex();
    hash.as_str()[..FINGERPRINT_LEN].to_string()
}

pub fn is_fingerprint(candidate: &str) -> bool {
    candidate.len() == FINGERPRINT_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit())
}
