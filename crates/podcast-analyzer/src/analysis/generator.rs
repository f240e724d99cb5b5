use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analysis::anthropic::AnthropicGenerator;
use crate::analysis::simulator::SimulatedGenerator;
use crate::config::Config;
use crate::error::Result;
use crate::store::{Preferences, Transcript};

/// Everything a generator may look at. Live backends only send `prompt`;
/// the simulator scores the raw transcript and preferences directly.
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub transcript: &'a Transcript,
    pub preferences: &'a Preferences,
}

/// External text-generation capability behind the analysis engine
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Recorded on every result as `model`
    fn model_name(&self) -> &str;

    /// Raw completion text, expected to contain one JSON analysis object
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Pick the backend once at startup
pub fn create_generator(config: &Config) -> anyhow::Result<Arc<dyn TextGenerator>> {
    if config.use_live_backend()? {
        let generator = AnthropicGenerator::from_config(config)?;
        info!("Using live analysis backend: {}", generator.model_name());
        Ok(Arc::new(generator))
    } else {
        info!("No API key in use, falling back to the deterministic local simulator");
        Ok(Arc::new(SimulatedGenerator::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendMode;
    use std::path::Path;

    #[test]
    fn test_simulator_selected_without_key() {
        let config = Config::for_data_dir(Path::new("/tmp"));
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), SimulatedGenerator::MODEL_NAME);
    }

    #[test]
    fn test_live_selected_with_key() {
        let mut config = Config::for_data_dir(Path::new("/tmp"));
        config.anthropic_api_key = Some("sk-test".into());
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), config.llm_model);
    }

    #[test]
    fn test_forced_live_without_key_fails() {
        let mut config = Config::for_data_dir(Path::new("/tmp"));
        config.backend_mode = BackendMode::Live;
        assert!(create_generator(&config).is_err());
    }
}
