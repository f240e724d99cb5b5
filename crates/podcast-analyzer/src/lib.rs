//! Podcast transcript analysis service.
//!
//! Scores transcripts for freshness and insight with an LLM (or a
//! deterministic local simulator), caches results per preference fingerprint,
//! and serves everything over a small JSON API.

pub mod analysis;
pub mod api;
pub mod batch;
pub mod cache_management;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod shared_state;
pub mod store;
pub mod telemetry;
pub mod utils;

// Public API exports
pub use analysis::{AnalysisEngine, AnalysisResult, AnalysisService, TextGenerator};
pub use batch::run_batch;
pub use cache_management::{fingerprint, ResultCache};
pub use config::Config;
pub use error::{AnalyzerError, Result};
pub use server::{build_router, run_server};
pub use shared_state::AppState;
