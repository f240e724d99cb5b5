//! Transcript analysis: prompt construction, text generation backends,
//! response parsing and the cached request flow.

pub mod anthropic;
pub mod engine;
pub mod generator;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod simulator;
pub mod types;

pub use anthropic::AnthropicGenerator;
pub use engine::AnalysisEngine;
pub use generator::{create_generator, GenerationRequest, TextGenerator};
pub use parser::{extract_json_block, parse_analysis};
pub use prompt::build_prompt;
pub use service::{AnalysisService, BatchEntry, BatchReport};
pub use simulator::SimulatedGenerator;
pub use types::{AnalysisResult, Highlight, KeyCharacteristics, ParsedAnalysis};
