//! Read-only transcript lookup backed by a directory of `.txt` files and a
//! JSON metadata map keyed by podcast id.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{validate_identifier, AnalyzerError, Result};
use crate::store::schema::{PodcastSummary, Transcript, TranscriptMetadata};
use crate::utils::TextUtils;

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// All known podcasts, sorted by id
    async fn list(&self) -> Result<Vec<PodcastSummary>>;

    /// Full transcript text plus metadata
    async fn get(&self, podcast_id: &str) -> Result<Transcript>;
}

pub struct FileTranscriptStore {
    transcripts_dir: PathBuf,
    metadata_path: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(transcripts_dir: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            transcripts_dir: transcripts_dir.into(),
            metadata_path: metadata_path.into(),
        }
    }

    fn transcript_path(&self, podcast_id: &str) -> PathBuf {
        self.transcripts_dir.join(format!("{}.txt", podcast_id))
    }

    async fn load_metadata(&self) -> Result<HashMap<String, TranscriptMetadata>> {
        match tokio::fs::read_to_string(&self.metadata_path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No metadata file at {}", self.metadata_path.display());
                Ok(HashMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn transcript_ids(dir: &Path) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Transcript directory missing: {}", dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_identifier("podcast id", stem).is_ok() {
                    ids.push(stem.to_string());
                }
            }
        }
        Ok(ids)
    }

    /// Title used when a transcript has no metadata entry
    pub fn derive_title(podcast_id: &str) -> String {
        let title = podcast_id
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ");
        TextUtils::truncate_with_ellipsis(&title, 80).into_owned()
    }

    fn fill_missing(podcast_id: &str, metadata: TranscriptMetadata) -> TranscriptMetadata {
        if metadata.title.trim().is_empty() {
            TranscriptMetadata {
                title: Self::derive_title(podcast_id),
                ..metadata
            }
        } else {
            metadata
        }
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn list(&self) -> Result<Vec<PodcastSummary>> {
        let mut metadata = self.load_metadata().await?;
        let mut podcasts: BTreeMap<String, PodcastSummary> = BTreeMap::new();

        for id in Self::transcript_ids(&self.transcripts_dir).await? {
            let meta = Self::fill_missing(&id, metadata.remove(&id).unwrap_or_default());
            podcasts.insert(id.clone(), PodcastSummary::from_metadata(&id, &meta));
        }
        // Metadata-only entries are still listed, analysis of them reports not-found
        for (id, meta) in metadata {
            let meta = Self::fill_missing(&id, meta);
            podcasts.insert(id.clone(), PodcastSummary::from_metadata(&id, &meta));
        }

        debug!("Listed {} podcasts", podcasts.len());
        Ok(podcasts.into_values().collect())
    }

    async fn get(&self, podcast_id: &str) -> Result<Transcript> {
        validate_identifier("podcast id", podcast_id)?;

        let text = match tokio::fs::read_to_string(self.transcript_path(podcast_id)).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AnalyzerError::not_found(format!("Transcript not found: {}", podcast_id)));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = self
            .load_metadata()
            .await?
            .remove(podcast_id)
            .unwrap_or_default();

        Ok(Transcript {
            id: podcast_id.to_string(),
            text,
            metadata: Self::fill_missing(podcast_id, metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileTranscriptStore) {
        let dir = TempDir::new().unwrap();
        let transcripts = dir.path().join("transcripts");
        std::fs::create_dir_all(&transcripts).unwrap();
        std::fs::write(transcripts.join("snowflake_ceo.txt"), "Host: welcome").unwrap();
        std::fs::write(transcripts.join("daily_habits.txt"), "Guest: hustle").unwrap();
        std::fs::write(transcripts.join("notes.md"), "ignored").unwrap();
        std::fs::write(
            dir.path().join("transcripts_metadata.json"),
            r#"{"daily_habits": {"title": "Daily Habits", "duration": "42:10", "date": "2024-03-01", "topics": ["generic productivity"]}}"#,
        )
        .unwrap();
        let store = FileTranscriptStore::new(transcripts, dir.path().join("transcripts_metadata.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_list_merges_files_and_metadata() {
        let (_dir, store) = setup();
        let podcasts = store.list().await.unwrap();

        let ids: Vec<&str> = podcasts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["daily_habits", "snowflake_ceo"]);
        assert_eq!(podcasts[0].duration.as_deref(), Some("42:10"));
        assert_eq!(podcasts[1].title, "Snowflake Ceo");
    }

    #[tokio::test]
    async fn test_get_missing_transcript_is_not_found() {
        let (_dir, store) = setup();
        let err = store.get("unknown_show").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_loads_text_and_topics() {
        let (_dir, store) = setup();
        let transcript = store.get("daily_habits").await.unwrap();
        assert_eq!(transcript.text, "Guest: hustle");
        assert_eq!(transcript.metadata.topics, vec!["generic productivity".to_string()]);
    }

    #[tokio::test]
    async fn test_list_without_directories_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileTranscriptStore::new(dir.path().join("nope"), dir.path().join("nope.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_derive_title_truncates() {
        assert_eq!(FileTranscriptStore::derive_title("anthropic_cpo"), "Anthropic Cpo");
        let long_id = "word_".repeat(30);
        let title = FileTranscriptStore::derive_title(&long_id);
        assert_eq!(title.len(), 80);
        assert!(title.ends_with("..."));
    }
}
