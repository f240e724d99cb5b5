//! File-backed analysis cache with an in-process hot layer.
//!
//! One JSON file per (podcast, preference fingerprint) under the cache
//! directory. Entries never expire; they are only removed by an explicit clear.
//! Concurrent misses for the same key may both write, and the last write wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisResult;
use crate::cache_management::fingerprint::is_fingerprint;
use crate::metrics;
use crate::store::Preferences;

/// On-disk cache record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub podcast_id: String,
    pub fingerprint: String,
    pub preferences: Preferences,
    pub cached_at: DateTime<Utc>,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hot_entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub cache_dir: String,
}

pub struct ResultCache {
    cache_dir: PathBuf,
    hot: Cache<String, Arc<AnalysisResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl ResultCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            hot: Cache::builder().build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn key(podcast_id: &str, fingerprint: &str) -> String {
        format!("{}_{}", podcast_id, fingerprint)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Cached analysis marked `cached = true`, or `None` on a miss.
    ///
    /// An unreadable or corrupt file counts as a miss and is overwritten by the
    /// next write.
    pub async fn get(&self, podcast_id: &str, fingerprint: &str) -> Option<AnalysisResult> {
        let key = Self::key(podcast_id, fingerprint);

        let found = match self.hot.get(&key).await {
            Some(result) => Some(result),
            None => self.load_from_disk(&key).await,
        };

        match found {
            Some(result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(true);
                debug!("Cache hit for {}", key);
                let mut result = (*result).clone();
                result.cached = true;
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(false);
                debug!("Cache miss for {}", key);
                None
            }
        }
    }

    async fn load_from_disk(&self, key: &str) -> Option<Arc<AnalysisResult>> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => {
                let result = Arc::new(entry.analysis);
                self.hot.insert(key.to_string(), result.clone()).await;
                Some(result)
            }
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store a fresh analysis, replacing any previous entry for the same key
    pub async fn put(&self, result: &AnalysisResult, preferences: &Preferences) -> crate::error::Result<()> {
        let key = Self::key(&result.podcast_id, &result.fingerprint);
        let mut stored = result.clone();
        stored.cached = false;

        let entry = CacheEntry {
            podcast_id: stored.podcast_id.clone(),
            fingerprint: stored.fingerprint.clone(),
            preferences: preferences.clone(),
            cached_at: Utc::now(),
            analysis: stored,
        };

        fs::create_dir_all(&self.cache_dir).await?;
        let path = self.entry_path(&key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&entry)?).await?;
        fs::rename(&tmp, &path).await?;

        self.hot.insert(key.clone(), Arc::new(entry.analysis)).await;
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!("Cached analysis {}", key);
        Ok(())
    }

    /// Remove every entry. Returns how many files were deleted.
    pub async fn clear(&self) -> crate::error::Result<usize> {
        let removed = self.remove_matching(|_| true).await?;
        self.hot.invalidate_all();
        info!("Cleared {} cached analyses", removed.len());
        Ok(removed.len())
    }

    /// Remove all entries for one podcast, across every fingerprint
    pub async fn clear_podcast(&self, podcast_id: &str) -> crate::error::Result<usize> {
        let prefix = format!("{}_", podcast_id);
        let removed = self
            .remove_matching(|key| {
                key.strip_prefix(&prefix)
                    .map(is_fingerprint)
                    .unwrap_or(false)
            })
            .await?;

        for key in &removed {
            self.hot.invalidate(key).await;
        }
        info!("Cleared {} cached analyses for {}", removed.len(), podcast_id);
        Ok(removed.len())
    }

    async fn remove_matching<F>(&self, matches: F) -> crate::error::Result<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let mut removed = Vec::new();
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
            Err(e) => return Err(e.into()),
        };

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string) else {
                continue;
            };
            if matches(&key) {
                fs::remove_file(&path).await?;
                removed.push(key);
            }
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> crate::error::Result<CacheStats> {
        let mut entries = 0;
        match fs::read_dir(&self.cache_dir).await {
            Ok(mut dir) => {
                while let Some(item) = dir.next_entry().await? {
                    if item.path().extension().and_then(|ext| ext.to_str()) == Some("json") {
                        entries += 1;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.hot.run_pending_tasks().await;
        Ok(CacheStats {
            entries,
            hot_entries: self.hot.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            cache_dir: self.cache_dir.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::KeyCharacteristics;
    use tempfile::tempdir;

    const FP_A: &str = "0123456789abcdef";
    const FP_B: &str = "fedcba9876543210";

    fn result(podcast_id: &str, fingerprint: &str) -> AnalysisResult {
        AnalysisResult {
            analysis_id: AnalysisResult::analysis_id_for(podcast_id, fingerprint),
            podcast_id: podcast_id.into(),
            fingerprint: fingerprint.into(),
            freshness_score: 6,
            freshness_reasoning: "r".into(),
            insight_score: 7,
            insight_reasoning: "r".into(),
            highlights: vec![],
            key_characteristics: KeyCharacteristics::default(),
            summary: "s".into(),
            unique_insights: vec![],
            model: "test".into(),
            analyzed_at: Utc::now(),
            cached: false,
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let dir = tempdir().unwrap();
        let cache = ResultCache::new(dir.path());

        assert!(cache.get("ep1", FP_A).await.is_none());
        cache.put(&result("ep1", FP_A), &Preferences::default()).await.unwrap();

        let hit = cache.get("ep1", FP_A).await.unwrap();
        assert!(hit.cached);
        assert_eq!(hit.insight_score, 7);
        assert!(cache.get("ep1", FP_B).await.is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!((stats.entries, stats.hits, stats.misses, stats.writes), (1, 1, 2, 1));
    }

    #[tokio::test]
    async fn test_entries_survive_restart() {
        let dir = tempdir().unwrap();
        ResultCache::new(dir.path())
            .put(&result("ep1", FP_A), &Preferences::default())
            .await
            .unwrap();

        let reopened = ResultCache::new(dir.path());
        assert!(reopened.get("ep1", FP_A).await.unwrap().cached);

        let raw = std::fs::read_to_string(dir.path().join(format!("ep1_{}.json", FP_A))).unwrap();
        let entry: CacheEntry = serde_json::from_str(&raw).unwrap();
        assert!(!entry.analysis.cached);
        assert_eq!(entry.preferences, Preferences::default());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(format!("ep1_{}.json", FP_A)), "{not json").unwrap();

        let cache = ResultCache::new(dir.path());
        assert!(cache.get("ep1", FP_A).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_podcast_only_touches_that_podcast() {
        let dir = tempdir().unwrap();
        let cache = ResultCache::new(dir.path());
        for (id, fp) in [("ep1", FP_A), ("ep1", FP_B), ("ep1_extra", FP_A), ("ep2", FP_A)] {
            cache.put(&result(id, fp), &Preferences::default()).await.unwrap();
        }

        assert_eq!(cache.clear_podcast("ep1").await.unwrap(), 2);
        assert!(cache.get("ep1", FP_A).await.is_none());
        assert!(cache.get("ep1_extra", FP_A).await.is_some());
        assert!(cache.get("ep2", FP_A).await.is_some());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let dir = tempdir().unwrap();
        let cache = ResultCache::new(dir.path().join("nested"));
        assert_eq!(cache.clear().await.unwrap(), 0);

        cache.put(&result("ep1", FP_A), &Preferences::default()).await.unwrap();
        cache.put(&result("ep2", FP_B), &Preferences::default()).await.unwrap();

        assert_eq!(cache.clear().await.unwrap(), 2);
        assert!(cache.get("ep1", FP_A).await.is_none());
        assert_eq!(cache.stats().await.unwrap().entries, 0);
    }
}
