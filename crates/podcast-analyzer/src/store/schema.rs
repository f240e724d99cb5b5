//! Record types persisted by the file stores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Metadata entry from `transcripts_metadata.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A transcript with its metadata. Never mutated once loaded.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: String,
    pub text: String,
    pub metadata: TranscriptMetadata,
}

/// Row returned by the podcast listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastSummary {
    pub id: String,
    pub title: String,
    pub duration: Option<String>,
    pub date: Option<String>,
    pub topics: Vec<String>,
}

impl PodcastSummary {
    pub fn from_metadata(id: &str, metadata: &TranscriptMetadata) -> Self {
        Self {
            id: id.to_string(),
            title: metadata.title.clone(),
            duration: metadata.duration.clone(),
            date: metadata.date.clone(),
            topics: metadata.topics.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl FreshnessPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessPriority::Low => "low",
            FreshnessPriority::Medium => "medium",
            FreshnessPriority::High => "high",
        }
    }
}

/// Per-user preferences that steer scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Preferences {
    #[serde(default)]
    #[validate(length(max = 50))]
    pub topics_of_interest: Vec<String>,
    #[serde(default)]
    pub freshness_priority: FreshnessPriority,
    #[serde(default = "default_insight_style")]
    #[validate(length(min = 1, max = 64))]
    pub insight_style: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub avoid_topics: Vec<String>,
}

fn default_insight_style() -> String {
    "general".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            topics_of_interest: Vec::new(),
            freshness_priority: FreshnessPriority::Medium,
            insight_style: default_insight_style(),
            avoid_topics: Vec::new(),
        }
    }
}

/// Rating payload accepted from clients
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RatingSubmission {
    pub user_id: String,
    pub podcast_id: String,
    #[serde(default)]
    pub analysis_id: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub freshness_rating: u8,
    #[validate(range(min = 1, max = 10))]
    pub insight_rating: u8,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub feedback: String,
}

/// Rating as appended to the feedback log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub rating_id: String,
    pub user_id: String,
    pub podcast_id: String,
    pub analysis_id: Option<String>,
    pub freshness_rating: u8,
    pub insight_rating: u8,
    pub feedback: String,
    pub submitted_at: DateTime<Utc>,
}

impl RatingRecord {
    pub fn from_submission(submission: RatingSubmission) -> Self {
        Self {
            rating_id: uuid::Uuid::new_v4().to_string(),
            user_id: submission.user_id,
            podcast_id: submission.podcast_id,
            analysis_id: submission.analysis_id,
            freshness_rating: submission.freshness_rating,
            insight_rating: submission.insight_rating,
            feedback: submission.feedback,
            submitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_fill_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"topics_of_interest": ["ai"]}"#).unwrap();
        assert_eq!(prefs.topics_of_interest, vec!["ai".to_string()]);
        assert_eq!(prefs.freshness_priority, FreshnessPriority::Medium);
        assert_eq!(prefs.insight_style, "general");
        assert!(prefs.avoid_topics.is_empty());
    }

    #[test]
    fn test_freshness_priority_lowercase_wire_format() {
        let json = serde_json::to_string(&FreshnessPriority::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn test_rating_range_validation() {
        let rating = RatingSubmission {
            user_id: "u1".into(),
            podcast_id: "p1".into(),
            analysis_id: None,
            freshness_rating: 11,
            insight_rating: 5,
            feedback: String::new(),
        };
        assert!(rating.validate().is_err());

        let rating = RatingSubmission { freshness_rating: 10, ..rating };
        assert!(rating.validate().is_ok());
    }

    #[test]
    fn test_empty_insight_style_rejected() {
        let prefs = Preferences {
            insight_style: String::new(),
            ..Preferences::default()
        };
        assert!(prefs.validate().is_err());
    }
}
