//! Conversation state for a single question.
//!
//! The turn list is append-only and lives for exactly one question; nothing
//! is persisted across questions.

use std::path::PathBuf;

use crate::llm::client::{ChatMessage, ToolCall};

/// One entry in the conversation history.
#[derive(Debug, Clone)]
pub enum Turn {
    /// User input or follow-up instruction.
    User(String),

    /// Model output, possibly requesting tool invocations.
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },

    /// Result text from a dispatched tool.
    Tool { name: String, content: String },
}

/// State carried across the orchestration loop.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Conversation turns, oldest first. Append-only.
    pub turns: Vec<Turn>,

    /// Database the tools operate on.
    pub db_path: PathBuf,

    /// Plan text produced by the planning phase; advisory only.
    pub plan: String,

    /// Number of steps parsed out of the plan.
    pub planned_steps: usize,
}

impl AgentState {
    pub fn new(db_path: PathBuf, question: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::User(question.into())],
            db_path,
            plan: String::new(),
            planned_steps: 0,
        }
    }

    /// The original question (the first user turn).
    pub fn question(&self) -> &str {
        match self.turns.first() {
            Some(Turn::User(text)) => text,
            _ => "",
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Whether any tool-result turn came from the given tool.
    pub fn tool_was_called(&self, name: &str) -> bool {
        self.turns
            .iter()
            .any(|turn| matches!(turn, Turn::Tool { name: n, .. } if n == name))
    }

    /// The most recent `limit` turns, converted to chat messages.
    ///
    /// Older turns are dropped from the model's context to bound prompt
    /// size; nothing guarantees the model retains earlier tool results
    /// beyond this window.
    pub fn recent_messages(&self, limit: usize) -> Vec<ChatMessage> {
        let start = self.turns.len().saturating_sub(limit);
        self.turns[start..]
            .iter()
            .map(|turn| match turn {
                Turn::User(text) => ChatMessage::user(text.clone()),
                Turn::Assistant {
                    content,
                    tool_calls,
                } => {
                    let mut message = ChatMessage::assistant(content.clone());
                    message.tool_calls = tool_calls.clone();
                    message
                }
                Turn::Tool { content, .. } => ChatMessage::tool(content.clone()),
            })
            .collect()
    }

    /// Content of the last assistant turn that carried text.
    pub fn last_answer(&self) -> String {
        self.turns
            .iter()
            .rev()
            .find_map(|turn| match turn {
                Turn::Assistant { content, .. } if !content.is_empty() => Some(content.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}
