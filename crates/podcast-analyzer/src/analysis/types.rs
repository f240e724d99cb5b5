use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::UniqueInsight;

/// Upper bound on quotes kept per analysis
pub const MAX_UNIQUE_INSIGHTS: usize = 5;

/// A segment worth listening to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(alias = "insight")]
    pub segment: String,
    #[serde(alias = "why_valuable")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCharacteristics {
    pub has_specific_data: bool,
    pub has_concrete_examples: bool,
    pub has_novel_frameworks: bool,
    pub has_contrarian_takes: bool,
    pub has_actionable_advice: bool,
}

/// Fields the text generator is asked to produce
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAnalysis {
    pub freshness_score: f64,
    pub freshness_reasoning: String,
    pub insight_score: f64,
    pub insight_reasoning: String,
    #[serde(alias = "top_5_takeaways")]
    pub highlights: Vec<Highlight>,
    pub key_characteristics: KeyCharacteristics,
    pub summary: String,
    #[serde(default)]
    pub unique_insights: Vec<UniqueInsight>,
}

/// Scored analysis of one transcript under one preference fingerprint.
///
/// Written to the cache once and replaced wholesale on re-analysis. `cached`
/// is stored as `false` and set on the way out of a cache hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub podcast_id: String,
    pub fingerprint: String,
    pub freshness_score: u8,
    pub freshness_reasoning: String,
    pub insight_score: u8,
    pub insight_reasoning: String,
    pub highlights: Vec<Highlight>,
    pub key_characteristics: KeyCharacteristics,
    pub summary: String,
    #[serde(default)]
    pub unique_insights: Vec<UniqueInsight>,
    pub model: String,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default)]
    pub cached: bool,
}

impl AnalysisResult {
    pub fn analysis_id_for(podcast_id: &str, fingerprint: &str) -> String {
        format!("{}_{}", podcast_id, fingerprint)
    }
}
