//! File-backed stores for transcripts, preferences and ratings

pub mod preference_store;
pub mod rating_store;
pub mod schema;
pub mod transcript_store;

pub use preference_store::{FilePreferenceStore, InMemoryPreferenceStore, PreferenceStore, DEFAULT_USER_ID};
pub use rating_store::{FileRatingStore, RatingStore};
pub use schema::{
    FreshnessPriority, PodcastSummary, Preferences, RatingRecord, RatingSubmission, Transcript,
    TranscriptMetadata,
};
pub use transcript_store::{FileTranscriptStore, TranscriptStore};
