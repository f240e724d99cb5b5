use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::analysis::generator::{GenerationRequest, TextGenerator};
use crate::analysis::parser::{parse_analysis, round_score};
use crate::analysis::prompt::build_prompt;
use crate::analysis::types::AnalysisResult;
use crate::error::Result;
use crate::store::{Preferences, Transcript};
use crate::utils::TextUtils;

/// Prompt construction, one generator call and response parsing.
///
/// Holds no cache; see `AnalysisService` for the memoized flow.
#[derive(Clone)]
pub struct AnalysisEngine {
    generator: Arc<dyn TextGenerator>,
    char_limit: usize,
}

impl AnalysisEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, char_limit: usize) -> Self {
        Self { generator, char_limit }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    pub async fn analyze(
        &self,
        transcript: &Transcript,
        preferences: &Preferences,
        fingerprint: &str,
    ) -> Result<AnalysisResult> {
        let prompt = build_prompt(transcript, preferences, self.char_limit);
        debug!(
            "Built {} char prompt for {} ({} transcript words)",
            prompt.len(),
            transcript.id,
            TextUtils::count_words(&transcript.text)
        );

        let request = GenerationRequest {
            prompt: &prompt,
            transcript,
            preferences,
        };
        let raw = self.generator.generate(&request).await?;

        let parsed = parse_analysis(&raw).map_err(|e| {
            warn!("Unusable analysis for {} from {}: {}", transcript.id, self.model_name(), e);
            e
        })?;

        Ok(AnalysisResult {
            analysis_id: AnalysisResult::analysis_id_for(&transcript.id, fingerprint),
            podcast_id: transcript.id.clone(),
            fingerprint: fingerprint.to_string(),
            freshness_score: round_score(parsed.freshness_score),
            freshness_reasoning: parsed.freshness_reasoning,
            insight_score: round_score(parsed.insight_score),
            insight_reasoning: parsed.insight_reasoning,
            highlights: parsed.highlights,
            key_characteristics: parsed.key_characteristics,
            summary: parsed.summary,
            unique_insights: parsed.unique_insights,
            model: self.model_name().to_string(),
            analyzed_at: Utc::now(),
            cached: false,
        })
    }
}
