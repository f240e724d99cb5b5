//! Pulls quotable insight lines out of a raw transcript

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::utils::TextUtils;

lazy_static! {
    static ref INSIGHT_KEYWORDS: Vec<&'static str> = vec![
        "counterintuitive", "counter-intuitive", "surprising", "unexpected",
        "interesting", "novel", "key insight", "important", "fascinating",
        "contrarian", "non-obvious", "the data shows", "we found that",
        "what we discovered", "turns out", "actually",
    ];
    static ref DATA_WORDS: Vec<&'static str> = vec!["percent", "%", "study", "research"];
    static ref FRAMEWORK_WORDS: Vec<&'static str> = vec!["framework", "model", "pattern"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightKind {
    #[serde(rename = "Counter-intuitive Finding")]
    CounterIntuitive,
    #[serde(rename = "Data-Backed Insight")]
    DataBacked,
    #[serde(rename = "Novel Framework")]
    NovelFramework,
    #[serde(rename = "Key Insight")]
    KeyInsight,
}

/// Verbatim quote from the transcript with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub quote: String,
}

#[derive(Debug, Clone)]
pub struct InsightExtractor {
    max_insights: usize,
    min_line_length: usize,
    max_quote_length: usize,
}

impl Default for InsightExtractor {
    fn default() -> Self {
        Self {
            max_insights: crate::analysis::types::MAX_UNIQUE_INSIGHTS,
            min_line_length: 20,
            max_quote_length: 300,
        }
    }
}

impl InsightExtractor {
    pub fn new(max_insights: usize, min_line_length: usize, max_quote_length: usize) -> Self {
        Self {
            max_insights,
            min_line_length,
            max_quote_length,
        }
    }

    pub fn extract(&self, transcript: &str) -> Vec<UniqueInsight> {
        let mut insights: Vec<UniqueInsight> = Vec::new();

        for line in transcript.lines() {
            if insights.len() >= self.max_insights {
                break;
            }
            let lowered = line.to_lowercase();
            let has_keyword = TextUtils::contains_any(&lowered, &INSIGHT_KEYWORDS);
            let has_data = line.chars().any(|c| c.is_ascii_digit())
                && TextUtils::contains_any(&lowered, &DATA_WORDS);
            if !has_keyword && !has_data {
                continue;
            }

            let trimmed = line.trim();
            if trimmed.chars().count() <= self.min_line_length {
                continue;
            }
            let cleaned = trimmed.replace("Host:", "").replace("Guest:", "");
            let cleaned = TextUtils::normalize_whitespace(cleaned.trim());
            let quote = TextUtils::truncate_chars(&cleaned, self.max_quote_length).to_string();

            if insights.iter().any(|existing| existing.quote == quote) {
                continue;
            }
            insights.push(UniqueInsight {
                kind: Self::classify(&lowered, has_data),
                quote,
            });
        }

        insights
    }

    fn classify(lowered: &str, has_data: bool) -> InsightKind {
        if TextUtils::contains_any(lowered, &["counterintuitive", "counter-intuitive", "surprising"]) {
            InsightKind::CounterIntuitive
        } else if has_data {
            InsightKind::DataBacked
        } else if TextUtils::contains_any(lowered, &FRAMEWORK_WORDS) {
            InsightKind::NovelFramework
        } else {
            InsightKind::KeyInsight
        }
    }
}
