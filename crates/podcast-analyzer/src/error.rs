//! Error types shared by the stores, the analysis engine and the cache

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Transcript, user or cache entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected identifier or request payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The text generator answered, but not with a usable analysis
    #[error("Failed to parse analysis response: {0}")]
    Parse(String),

    /// The text generator could not be reached or returned an error status
    #[error("Analysis backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AnalyzerError::NotFound(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        AnalyzerError::InvalidInput(what.into())
    }

    pub fn parse(what: impl Into<String>) -> Self {
        AnalyzerError::Parse(what.into())
    }

    /// Short label used in metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerError::NotFound(_) => "not_found",
            AnalyzerError::InvalidInput(_) => "invalid_input",
            AnalyzerError::Parse(_) => "parse",
            AnalyzerError::Backend(_) => "backend",
            AnalyzerError::Io(_) => "io",
            AnalyzerError::Serialization(_) => "serialization",
        }
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(e: reqwest::Error) -> Self {
        AnalyzerError::Backend(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AnalyzerError {
    fn from(e: validator::ValidationErrors) -> Self {
        AnalyzerError::InvalidInput(e.to_string())
    }
}

/// Reject identifiers that could escape the data directories.
pub fn validate_identifier(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(AnalyzerError::invalid(format!("{} cannot be empty", kind)));
    }
    if id.len() > 128 {
        return Err(AnalyzerError::invalid(format!("{} too long (max 128 chars)", kind)));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(AnalyzerError::invalid(format!(
            "{} contains invalid characters",
            kind
        )));
    }
    Ok(())
}
