//! Request flow: load transcript and preferences, consult the cache, analyze
//! on a miss, store the result.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::engine::AnalysisEngine;
use crate::analysis::types::AnalysisResult;
use crate::cache_management::{fingerprint, ResultCache};
use crate::error::Result;
use crate::metrics;
use crate::store::{PreferenceStore, TranscriptStore};

pub struct AnalysisService {
    transcripts: Arc<dyn TranscriptStore>,
    preferences: Arc<dyn PreferenceStore>,
    cache: Arc<ResultCache>,
    engine: AnalysisEngine,
}

/// One row of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub podcast_id: String,
    pub title: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freshness_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight_score: Option<u8>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of analyzing every transcript, best insight first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub user_id: String,
    pub fingerprint: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub average_freshness: Option<f64>,
    pub average_insight: Option<f64>,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn from_entries(user_id: &str, fingerprint: String, model: &str, mut entries: Vec<BatchEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.insight_score
                .cmp(&a.insight_score)
                .then_with(|| a.podcast_id.cmp(&b.podcast_id))
        });

        let scored: Vec<&BatchEntry> = entries.iter().filter(|e| e.success).collect();
        let average_freshness = average(scored.iter().filter_map(|e| e.freshness_score));
        let average_insight = average(scored.iter().filter_map(|e| e.insight_score));
        let succeeded = scored.len();

        Self {
            user_id: user_id.to_string(),
            fingerprint,
            model: model.to_string(),
            generated_at: Utc::now(),
            total: entries.len(),
            succeeded,
            failed: entries.len() - succeeded,
            average_freshness,
            average_insight,
            entries,
        }
    }

    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec_pretty(self)?).await?;
        info!("Batch summary written to {}", path.display());
        Ok(())
    }
}

fn average(scores: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, count) = scores.fold((0u32, 0u32), |(sum, count), score| (sum + u32::from(score), count + 1));
    if count == 0 {
        None
    } else {
        Some(f64::from(sum) / f64::from(count))
    }
}

impl AnalysisService {
    pub fn new(
        transcripts: Arc<dyn TranscriptStore>,
        preferences: Arc<dyn PreferenceStore>,
        cache: Arc<ResultCache>,
        engine: AnalysisEngine,
    ) -> Self {
        Self {
            transcripts,
            preferences,
            cache,
            engine,
        }
    }

    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    pub async fn analyze(&self, podcast_id: &str, user_id: &str, use_cache: bool) -> Result<AnalysisResult> {
        let transcript = self.transcripts.get(podcast_id).await?;
        let preferences = self.preferences.resolve(user_id).await?;
        let fp = fingerprint(&preferences);

        if use_cache {
            if let Some(hit) = self.cache.get(podcast_id, &fp).await {
                info!("Serving cached analysis for {} (user {})", podcast_id, user_id);
                return Ok(hit);
            }
        }

        info!("Analyzing {} for user {} with {}", podcast_id, user_id, self.model_name());
        let start = Instant::now();
        let result = match self.engine.analyze(&transcript, &preferences, &fp).await {
            Ok(result) => result,
            Err(e) => {
                metrics::inc_analysis_failure(e.kind());
                error!("Analysis of {} failed: {}", podcast_id, e);
                return Err(e);
            }
        };
        metrics::observe_analysis_duration(start.elapsed().as_secs_f64());

        self.cache.put(&result, &preferences).await?;
        Ok(result)
    }

    /// Analyze every known transcript for one user. Failures are recorded
    /// per podcast and never abort the run.
    pub async fn analyze_all(&self, user_id: &str, force: bool) -> Result<BatchReport> {
        let preferences = self.preferences.resolve(user_id).await?;
        let podcasts = self.transcripts.list().await?;
        info!("Batch analyzing {} podcasts for user {}", podcasts.len(), user_id);

        let mut entries = Vec::with_capacity(podcasts.len());
        for podcast in podcasts {
            let entry = match self.analyze(&podcast.id, user_id, !force).await {
                Ok(result) => BatchEntry {
                    podcast_id: podcast.id,
                    title: podcast.title,
                    success: true,
                    freshness_score: Some(result.freshness_score),
                    insight_score: Some(result.insight_score),
                    cached: result.cached,
                    error: None,
                },
                Err(e) => {
                    warn!("Skipping {} in batch: {}", podcast.id, e);
                    BatchEntry {
                        podcast_id: podcast.id,
                        title: podcast.title,
                        success: false,
                        freshness_score: None,
                        insight_score: None,
                        cached: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            entries.push(entry);
        }

        Ok(BatchReport::from_entries(
            user_id,
            fingerprint(&preferences),
            self.model_name(),
            entries,
        ))
    }
}
