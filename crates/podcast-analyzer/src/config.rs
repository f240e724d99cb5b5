// podcast-analyzer/crates/podcast-analyzer/src/config.rs

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Which text generator backs the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Live API when a key is configured, simulator otherwise
    Auto,
    Simulated,
    Live,
}

impl FromStr for BackendMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(BackendMode::Auto),
            "simulated" | "simulator" | "local" => Ok(BackendMode::Simulated),
            "live" | "anthropic" => Ok(BackendMode::Live),
            other => Err(anyhow!("Unknown ANALYZER_BACKEND '{}': expected auto, simulated or live", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub data_dir: PathBuf,
    pub transcripts_dir: PathBuf,
    pub metadata_file: PathBuf,
    pub users_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_timeout_seconds: u64,
    pub transcript_char_limit: usize,
    pub request_timeout_seconds: u64,
    pub backend_mode: BackendMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let data_dir = PathBuf::from(var("DATA_DIR", "."));
        let mut config = Self::for_data_dir(&data_dir);

        if let Some(dir) = lookup("TRANSCRIPTS_DIR") {
            config.transcripts_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("METADATA_FILE") {
            config.metadata_file = PathBuf::from(file);
        }
        if let Some(dir) = lookup("USERS_DIR") {
            config.users_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        config.api_host = var("API_HOST", &config.api_host);
        config.api_port = var("API_PORT", "8000").parse().context("API_PORT must be a port number")?;
        config.anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|key| !key.trim().is_empty());
        config.anthropic_base_url = var("ANTHROPIC_BASE_URL", &config.anthropic_base_url)
            .trim_end_matches('/')
            .to_string();
        config.llm_model = var("LLM_MODEL", &config.llm_model);
        config.llm_max_tokens = var("LLM_MAX_TOKENS", "2000")
            .parse()
            .context("LLM_MAX_TOKENS must be a positive integer")?;
        config.llm_temperature = var("LLM_TEMPERATURE", "0.3")
            .parse()
            .context("LLM_TEMPERATURE must be a number")?;
        config.llm_timeout_seconds = var("LLM_TIMEOUT_SECONDS", "120")
            .parse()
            .context("LLM_TIMEOUT_SECONDS must be a whole number of seconds")?;
        config.transcript_char_limit = var("TRANSCRIPT_CHAR_LIMIT", "50000")
            .parse()
            .context("TRANSCRIPT_CHAR_LIMIT must be a positive integer")?;
        config.request_timeout_seconds = var("REQUEST_TIMEOUT_SECONDS", "300")
            .parse()
            .context("REQUEST_TIMEOUT_SECONDS must be a whole number of seconds")?;
        config.backend_mode = var("ANALYZER_BACKEND", "auto").parse()?;

        if !(0.0..=1.0).contains(&config.llm_temperature) {
            return Err(anyhow!("LLM_TEMPERATURE must be between 0.0 and 1.0"));
        }
        if config.transcript_char_limit == 0 {
            return Err(anyhow!("TRANSCRIPT_CHAR_LIMIT must be greater than zero"));
        }

        Ok(config)
    }

    /// Defaults with every data path rooted at `data_dir`
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
            data_dir: data_dir.to_path_buf(),
            transcripts_dir: data_dir.join("transcripts"),
            metadata_file: data_dir.join("transcripts_metadata.json"),
            users_dir: data_dir.join("users"),
            cache_dir: data_dir.join("cache"),
            anthropic_api_key: None,
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            llm_model: "claude-sonnet-4-20250514".to_string(),
            llm_max_tokens: 2000,
            llm_temperature: 0.3,
            llm_timeout_seconds: 120,
            transcript_char_limit: 50_000,
            request_timeout_seconds: 300,
            backend_mode: BackendMode::Auto,
        }
    }

    /// Resolve the backend mode against the presence of an API key
    pub fn use_live_backend(&self) -> Result<bool> {
        match self.backend_mode {
            BackendMode::Auto => Ok(self.anthropic_api_key.is_some()),
            BackendMode::Simulated => Ok(false),
            BackendMode::Live if self.anthropic_api_key.is_some() => Ok(true),
            BackendMode::Live => Err(anyhow!("ANALYZER_BACKEND=live requires ANTHROPIC_API_KEY")),
        }
    }

    pub fn batch_summary_path(&self) -> PathBuf {
        self.data_dir.join("batch_summary.json")
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Transcripts: {}", self.transcripts_dir.display());
        info!("- Metadata: {}", self.metadata_file.display());
        info!("- Users: {}", self.users_dir.display());
        info!("- Cache: {}", self.cache_dir.display());
        info!("- Backend Mode: {:?}", self.backend_mode);
        info!(
            "- Anthropic API Key: {}",
            if self.anthropic_api_key.is_some() { "set" } else { "not set" }
        );
        info!("- Anthropic URL: {}", self.anthropic_base_url);
        info!("- Model: {} (max tokens {}, temperature {})", self.llm_model, self.llm_max_tokens, self.llm_temperature);
        info!("- LLM Timeout: {}s", self.llm_timeout_seconds);
        info!("- Transcript Limit: {} chars", self.transcript_char_limit);
        info!("- Request Timeout: {}s", self.request_timeout_seconds);
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))
    }
}
