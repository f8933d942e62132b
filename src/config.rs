//! Runtime configuration.
//!
//! Constructed explicitly and passed into the orchestrator and tools; there
//! is no process-global state.

use std::path::PathBuf;

/// Default chat endpoint (local Ollama server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "qwen3:1.7b";

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ollama-compatible chat endpoint.
    pub base_url: String,

    /// Model identifier sent with every chat request.
    pub model: String,

    /// Safety bound: once the conversation exceeds this many turns, the
    /// loop terminates whether or not an answer was produced.
    pub max_turns: usize,

    /// How many recent turns are kept in the model's context window.
    pub context_turns: usize,

    /// Directory chart images are written to.
    pub viz_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_turns: 10,
            context_turns: 3,
            viz_dir: PathBuf::from("visualizations"),
        }
    }
}
