//! State shared by every request handler
//!
//! Stores, cache and analysis service are built once at startup and handed to
//! axum behind `Arc`s. The only mutable shared data are lock-free counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::{
    analysis::{create_generator, AnalysisEngine, AnalysisService, TextGenerator},
    cache_management::ResultCache,
    config::Config,
    store::{
        FilePreferenceStore, FileRatingStore, FileTranscriptStore, PreferenceStore, RatingStore,
        TranscriptStore,
    },
};

/// Atomic counters for system metrics
#[derive(Debug, Default)]
pub struct AtomicCounters {
    pub total_requests: AtomicUsize,
    pub analyses_served: AtomicUsize,
    pub ratings_recorded: AtomicUsize,
}

impl AtomicCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_total_requests(&self) -> usize {
        self.total_requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn inc_analyses_served(&self) -> usize {
        self.analyses_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn inc_ratings_recorded(&self) -> usize {
        self.ratings_recorded.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.total_requests.load(Ordering::Relaxed),
            self.analyses_served.load(Ordering::Relaxed),
            self.ratings_recorded.load(Ordering::Relaxed),
        )
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Configuration (read-only after initialization)
    pub config: Arc<Config>,
    pub transcripts: Arc<dyn TranscriptStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub ratings: Arc<dyn RatingStore>,
    pub cache: Arc<ResultCache>,
    pub analysis: Arc<AnalysisService>,
    pub counters: Arc<AtomicCounters>,
    pub started_at: Instant,
}

impl AppState {
    /// File-backed stores and the configured text generator
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let generator = create_generator(&config)?;
        Ok(Self::with_generator(config, generator))
    }

    pub fn with_generator(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let transcripts: Arc<dyn TranscriptStore> = Arc::new(FileTranscriptStore::new(
            config.transcripts_dir.clone(),
            config.metadata_file.clone(),
        ));
        let preferences: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::new(config.users_dir.clone()));
        let ratings: Arc<dyn RatingStore> = Arc::new(FileRatingStore::new(config.users_dir.clone()));
        let cache = Arc::new(ResultCache::new(config.cache_dir.clone()));

        let engine = AnalysisEngine::new(generator, config.transcript_char_limit);
        let analysis = Arc::new(AnalysisService::new(
            transcripts.clone(),
            preferences.clone(),
            cache.clone(),
            engine,
        ));
        info!("Shared state initialized with model {}", analysis.model_name());

        Self {
            config: Arc::new(config),
            transcripts,
            preferences,
            ratings,
            cache,
            analysis,
            counters: Arc::new(AtomicCounters::new()),
            started_at: Instant::now(),
        }
    }
}
