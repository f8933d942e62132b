//! Model boundary: chat client types and natural-language-to-SQL translation.

pub mod client;
pub mod translator;

pub use client::{ChatClient, ChatMessage, FunctionCall, OllamaClient, ToolCall, ToolSpec};
pub use translator::{nl_to_sql, strip_sql_fences};
