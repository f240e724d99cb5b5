//! Analysis result caching keyed by podcast and preference fingerprint

pub mod fingerprint;
pub mod result_cache;

pub use fingerprint::{fingerprint, is_fingerprint, normalize_topics, FINGERPRINT_LEN};
pub use result_cache::{CacheEntry, CacheStats, ResultCache};
