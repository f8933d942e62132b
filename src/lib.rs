//! AgentSQL - natural language to SQL assistant
//!
//! Answers plain-text questions about a SQLite database by driving a local
//! chat model through a plan/execute loop:
//! - Schema introspection and read-only query execution
//! - Natural-language-to-SQL translation via the model
//! - Chart rendering of tabular results (bar, line, pie, scatter, heatmap)
//!
//! The model is reached through the [`llm::ChatClient`] trait so the
//! orchestrator can be driven by a scripted double in tests.

pub mod agent;
pub mod config;
pub mod db;
pub mod llm;
pub mod types;
pub mod viz;

pub use agent::{AgentState, Orchestrator, Phase, StepEvent, Turn};
pub use config::Config;
pub use llm::{ChatClient, ChatMessage, OllamaClient, ToolCall, ToolSpec};
pub use types::{AgentError, CellValue, Result, TableData};
