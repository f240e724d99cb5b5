//! Turns raw generator output into a validated `ParsedAnalysis`

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::types::{ParsedAnalysis, MAX_UNIQUE_INSIGHTS};
use crate::error::{AnalyzerError, Result};

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid fence regex");
}

/// Locate the JSON object in a completion.
///
/// A fenced block wins; otherwise everything from the first `{` to the last `}`.
pub fn extract_json_block(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON.captures(text) {
        if let Some(body) = caps.get(1) {
            let body = body.as_str().trim();
            if !body.is_empty() {
                return Some(body);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn parse_analysis(text: &str) -> Result<ParsedAnalysis> {
    let block = extract_json_block(text).ok_or_else(|| AnalyzerError::parse("no JSON object in response"))?;
    let mut parsed: ParsedAnalysis =
        serde_json::from_str(block).map_err(|e| AnalyzerError::parse(format!("malformed analysis JSON: {}", e)))?;

    check_score("freshness_score", parsed.freshness_score)?;
    check_score("insight_score", parsed.insight_score)?;
    parsed.unique_insights.truncate(MAX_UNIQUE_INSIGHTS);
    Ok(parsed)
}

fn check_score(field: &str, score: f64) -> Result<()> {
    if !score.is_finite() || !(1.0..=10.0).contains(&score) {
        return Err(AnalyzerError::parse(format!("{} {} outside 1-10", field, score)));
    }
    Ok(())
}

/// Round a validated score to the stored integer form
pub fn round_score(score: f64) -> u8 {
    score.round().clamp(1.0, 10.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "freshness_score": 7,
        "freshness_reasoning": "Recent examples.",
        "insight_score": 6.5,
        "insight_reasoning": "Some novel points.",
        "highlights": [{"segment": "Pricing story", "value": "Concrete numbers", "timestamp": "12:30"}],
        "key_characteristics": {
            "has_specific_data": true,
            "has_concrete_examples": true,
            "has_novel_frameworks": false,
            "has_contrarian_takes": false,
            "has_actionable_advice": true
        },
        "summary": "Solid episode."
    }"#;

    #[test]
    fn test_parses_bare_json() {
        let parsed = parse_analysis(VALID).unwrap();

        assert_eq!(parsed.freshness_score, 7.0);
        assert_eq!(round_score(parsed.insight_score), 7);
        assert_eq!(parsed.highlights[0].timestamp.as_deref(), Some("12:30"));
        assert!(parsed.key_characteristics.has_specific_data);
        assert!(parsed.unique_insights.is_empty());
    }

    #[test]
    fn test_unwraps_code_fences() {
        let fenced = format!("Here you go:\n```json\n{}\n```\nThanks", VALID);
        assert!(parse_analysis(&fenced).is_ok());

        let bare_fence = format!("```\n{}\n```", VALID);
        assert!(parse_analysis(&bare_fence).is_ok());
    }

    #[test]
    fn test_takes_outermost_braces_from_prose() {
        let wrapped = format!("Sure! {} Let me know if you need more.", VALID);
        assert!(parse_analysis(&wrapped).is_ok());
    }

    #[test]
    fn test_accepts_alternate_highlight_spellings() {
        let text = VALID.replace(
            r#""highlights": [{"segment": "Pricing story", "value": "Concrete numbers", "timestamp": "12:30"}]"#,
            r#""top_5_takeaways": [{"insight": "Pricing story", "why_valuable": "Concrete numbers", "rank": 1}]"#,
        );
        let parsed = parse_analysis(&text).unwrap();

        assert_eq!(parsed.highlights[0].segment, "Pricing story");
        assert_eq!(parsed.highlights[0].value, "Concrete numbers");
        assert!(parsed.highlights[0].timestamp.is_none());
    }

    #[test]
    fn test_unique_insights_capped() {
        let quotes: Vec<String> = (0..7)
            .map(|i| format!(r#"{{"type": "Key Insight", "quote": "quote number {}"}}"#, i))
            .collect();
        let text = VALID.replace(
            r#""summary": "Solid episode.""#,
            &format!(r#""summary": "Solid episode.", "unique_insights": [{}]"#, quotes.join(", ")),
        );
        let parsed = parse_analysis(&text).unwrap();

        assert_eq!(parsed.unique_insights.len(), MAX_UNIQUE_INSIGHTS);
        assert_eq!(parsed.unique_insights[0].quote, "quote number 0");
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let text = VALID.replace(r#""freshness_score": 7"#, r#""freshness_score": 11"#);
        assert!(matches!(parse_analysis(&text), Err(AnalyzerError::Parse(_))));

        let text = VALID.replace(r#""insight_score": 6.5"#, r#""insight_score": 0"#);
        assert!(matches!(parse_analysis(&text), Err(AnalyzerError::Parse(_))));
    }

    #[test]
    fn test_missing_field_rejected() {
        let text = VALID.replace(r#""summary": "Solid episode.""#, r#""note": "x""#);
        assert!(matches!(parse_analysis(&text), Err(AnalyzerError::Parse(_))));
    }

    #[test]
    fn test_no_json_rejected() {
        assert!(matches!(parse_analysis("I cannot help with that."), Err(AnalyzerError::Parse(_))));
        assert!(extract_json_block("} backwards {").is_none());
    }
}
