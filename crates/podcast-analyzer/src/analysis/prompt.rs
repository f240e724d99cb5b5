use std::fmt::Write;

use crate::store::{FreshnessPriority, Preferences, Transcript};
use crate::utils::TextUtils;

const RUBRIC: &str = "\
1. **Freshness Score (1-10)**: How recent, timely, or cutting-edge is the information?
   - 1-3: Outdated information, old examples, or timeless/generic content
   - 4-6: Somewhat current, but not particularly time-sensitive
   - 7-8: Recent information, current examples (within last 6-12 months)
   - 9-10: Very recent developments, breaking trends, cutting-edge topics

2. **Insight Score (1-10)**: How non-obvious, valuable, and specific are the insights?
   - 1-3: Generic advice, common platitudes, no specific examples
   - 4-6: Moderately interesting, some specific examples
   - 7-8: Counter-intuitive ideas, novel frameworks, specific data/examples
   - 9-10: Highly novel perspectives, surprising data, actionable + specific insights

3. **Top 3 Highlights**: Identify the 3 most valuable segments worth listening to
   - Include what makes each segment valuable
   - Be specific about what insight or information is shared

4. **Key Characteristics**: Note if the podcast includes:
   - Specific data/numbers vs. vague claims
   - Concrete examples vs. generic statements
   - Novel frameworks or mental models
   - Contrarian or counter-intuitive takes
   - Actionable advice vs. motivational platitudes";

const RESPONSE_SHAPE: &str = r#"{
  "freshness_score": <number 1-10>,
  "freshness_reasoning": "<2-3 sentence explanation>",
  "insight_score": <number 1-10>,
  "insight_reasoning": "<2-3 sentence explanation>",
  "highlights": [
    {"segment": "<brief description>", "value": "<why it's worth listening to>", "timestamp": "<mm:ss, optional>"},
    {"segment": "<brief description>", "value": "<why it's worth listening to>", "timestamp": "<mm:ss, optional>"},
    {"segment": "<brief description>", "value": "<why it's worth listening to>", "timestamp": "<mm:ss, optional>"}
  ],
  "key_characteristics": {
    "has_specific_data": <boolean>,
    "has_concrete_examples": <boolean>,
    "has_novel_frameworks": <boolean>,
    "has_contrarian_takes": <boolean>,
    "has_actionable_advice": <boolean>
  },
  "summary": "<1-2 sentence overall assessment>"
}"#;

/// Build the analysis prompt for one transcript under one set of preferences.
///
/// The transcript is cut to `char_limit` characters.
pub fn build_prompt(transcript: &Transcript, preferences: &Preferences, char_limit: usize) -> String {
    let mut prompt = String::with_capacity(char_limit.min(transcript.text.len()) + 4096);

    prompt.push_str(
        "You are an expert podcast analyst helping busy listeners decide which episodes are worth their time.\n\n",
    );
    let _ = writeln!(prompt, "PODCAST: {}", transcript.metadata.title);
    if !transcript.metadata.topics.is_empty() {
        let _ = writeln!(prompt, "TOPICS: {}", transcript.metadata.topics.join(", "));
    }
    prompt.push('\n');

    prompt.push_str(&render_preferences(preferences));
    prompt.push_str("\nAnalyze this transcript and provide:\n\n");
    prompt.push_str(RUBRIC);
    prompt.push_str("\n\nTRANSCRIPT:\n");
    prompt.push_str(TextUtils::truncate_chars(&transcript.text, char_limit));
    prompt.push_str("\n\nProvide your response as valid JSON (no markdown formatting):\n");
    prompt.push_str(RESPONSE_SHAPE);
    prompt.push_str(
        "\n\nRemember: Be critical and honest. Most podcasts should score 4-6. Reserve 8+ for truly exceptional content.\n",
    );
    prompt
}

fn render_preferences(preferences: &Preferences) -> String {
    let mut section = String::from("USER PREFERENCES:\n");

    if preferences.topics_of_interest.is_empty() {
        section.push_str("- Topics of interest: none specified\n");
    } else {
        let _ = writeln!(
            section,
            "- Topics of interest (weigh insights on these higher): {}",
            preferences.topics_of_interest.join(", ")
        );
    }
    if !preferences.avoid_topics.is_empty() {
        let _ = writeln!(
            section,
            "- Topics to avoid (penalize time spent on these): {}",
            preferences.avoid_topics.join(", ")
        );
    }

    let priority_note = match preferences.freshness_priority {
        FreshnessPriority::High => "the listener wants the latest developments, judge freshness strictly",
        FreshnessPriority::Medium => "balance timely and evergreen material",
        FreshnessPriority::Low => "evergreen material is fine, do not penalize timeless content",
    };
    let _ = writeln!(
        section,
        "- Freshness priority: {} ({})",
        preferences.freshness_priority.as_str(),
        priority_note
    );
    let _ = writeln!(section, "- Desired insight style: {}", preferences.insight_style);
    section
}
