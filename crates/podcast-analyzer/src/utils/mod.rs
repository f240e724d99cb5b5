//! Text processing helpers used by prompt building and the local simulator

pub mod insight_extractor;
pub mod text_utils;

pub use insight_extractor::{InsightExtractor, InsightKind, UniqueInsight};
pub use text_utils::TextUtils;
