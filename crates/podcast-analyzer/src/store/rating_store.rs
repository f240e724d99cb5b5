//! Append-only feedback log, one JSON line per rating.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::{validate_identifier, Result};
use crate::store::schema::RatingRecord;

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn append(&self, rating: &RatingRecord) -> Result<()>;

    /// Ratings for a user in submission order
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RatingRecord>>;
}

/// `<users_dir>/ratings/<user_id>.jsonl`
pub struct FileRatingStore {
    ratings_dir: PathBuf,
}

impl FileRatingStore {
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self {
            ratings_dir: users_dir.into().join("ratings"),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.ratings_dir.join(format!("{}.jsonl", user_id))
    }
}

#[async_trait]
impl RatingStore for FileRatingStore {
    async fn append(&self, rating: &RatingRecord) -> Result<()> {
        validate_identifier("user id", &rating.user_id)?;
        validate_identifier("podcast id", &rating.podcast_id)?;
        tokio::fs::create_dir_all(&self.ratings_dir).await?;

        let mut line = serde_json::to_string(rating)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(&rating.user_id))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!(
            "Recorded rating {} from {} for {}",
            rating.rating_id, rating.user_id, rating.podcast_id
        );
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RatingRecord>> {
        validate_identifier("user id", user_id)?;
        let raw = match tokio::fs::read_to_string(self.path_for(user_id)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ratings = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RatingRecord>(line) {
                Ok(rating) => ratings.push(rating),
                // a torn trailing line must not hide the rest of the log
                Err(e) => warn!("Skipping unreadable rating line {} for {}: {}", idx + 1, user_id, e),
            }
        }
        Ok(ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::RatingSubmission;
    use tempfile::TempDir;

    fn rating(podcast_id: &str, score: u8) -> RatingRecord {
        RatingRecord::from_submission(RatingSubmission {
            user_id: "alice".into(),
            podcast_id: podcast_id.into(),
            analysis_id: None,
            freshness_rating: score,
            insight_rating: score,
            feedback: "solid".into(),
        })
    }

    #[tokio::test]
    async fn test_append_keeps_every_rating_in_order() {
        let dir = TempDir::new().unwrap();
        let store = FileRatingStore::new(dir.path());

        store.append(&rating("ep1", 3)).await.unwrap();
        store.append(&rating("ep1", 9)).await.unwrap();
        store.append(&rating("ep2", 5)).await.unwrap();

        let ratings = store.list_for_user("alice").await.unwrap();
        let scores: Vec<u8> = ratings.iter().map(|r| r.freshness_rating).collect();
        assert_eq!(scores, vec![3, 9, 5]);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_ratings() {
        let dir = TempDir::new().unwrap();
        let store = FileRatingStore::new(dir.path());
        assert!(store.list_for_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = FileRatingStore::new(dir.path());
        store.append(&rating("ep1", 4)).await.unwrap();

        let path = dir.path().join("ratings/alice.jsonl");
        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("{\"rating_id\": \n");
        std::fs::write(&path, raw).unwrap();

        assert_eq!(store.list_for_user("alice").await.unwrap().len(), 1);
    }
}
