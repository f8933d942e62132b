//! The plan/execute orchestration loop.
//!
//! An explicit finite-state machine drives one question to completion:
//!
//! ```text
//! Planning -> AwaitingModel -> DispatchingTool -> AwaitingModel -> ... -> Terminated
//! ```
//!
//! Planning runs once; the execution loop then lets the model choose tools
//! until it stops requesting them and a SQL query has been executed, or the
//! turn bound is hit. Termination is a heuristic: nothing verifies the final
//! answer actually addresses the question.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::agent::planner;
use crate::agent::state::{AgentState, Turn};
use crate::agent::tools;
use crate::config::Config;
use crate::llm::client::{ChatClient, ChatMessage, ToolCall};
use crate::types::Result;

/// Instruction template for execution turns. Placeholders are replaced with
/// the session database path, original question, and plan text.
const EXECUTION_TEMPLATE: &str = r#"You are a helpful SQL assistant with access to tools.

Database path: {db_path}

Original Question: {question}

Execution Plan:
{plan}

Follow the plan step by step:
1. First, use list_tables tool to see database structure
2. Then use nl_to_sql tool to convert the question to SQL
3. Use execute_sql tool to run the query
4. If visualization would help, use visualize_data tool

Start executing now by calling the appropriate tool."#;

/// Current state of the orchestration machine.
#[derive(Debug)]
pub enum Phase {
    /// Produce the plan (runs once).
    Planning,
    /// Ask the model for the next action.
    AwaitingModel,
    /// Dispatch the pending tool calls, one per step.
    DispatchingTool {
        current: ToolCall,
        rest: VecDeque<ToolCall>,
    },
    /// The loop is finished.
    Terminated,
}

/// Outcome of a single state-machine transition, surfaced so the caller can
/// narrate progress.
#[derive(Debug)]
pub enum StepEvent {
    /// Plan produced during the planning phase.
    Planned { plan: String, steps: usize },
    /// Model replied with text but no tool call, and the loop continues.
    ModelText { content: String },
    /// Model requested tool invocations.
    ToolRequests { names: Vec<String> },
    /// A tool finished; its result was appended to the conversation.
    ToolResult { name: String, content: String },
    /// The loop reached its terminal state; `answer` is the final model
    /// text (possibly empty on forced termination).
    Done { answer: String },
}

/// Drives one user question through planning, tool use, and termination.
pub struct Orchestrator<'a> {
    client: &'a dyn ChatClient,
    config: &'a Config,
    state: AgentState,
    phase: Phase,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        client: &'a dyn ChatClient,
        config: &'a Config,
        db_path: PathBuf,
        question: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config,
            state: AgentState::new(db_path, question),
            phase: Phase::Planning,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated)
    }

    /// Advance the machine by one transition.
    pub async fn step(&mut self) -> Result<StepEvent> {
        let phase = std::mem::replace(&mut self.phase, Phase::Terminated);
        match phase {
            Phase::Planning => self.run_planning().await,
            Phase::AwaitingModel => self.run_model_turn().await,
            Phase::DispatchingTool { current, rest } => self.run_dispatch(current, rest).await,
            Phase::Terminated => Ok(StepEvent::Done {
                answer: self.state.last_answer(),
            }),
        }
    }

    /// Run all remaining transitions and return the final answer.
    pub async fn run(&mut self) -> Result<String> {
        loop {
            if let StepEvent::Done { answer } = self.step().await? {
                return Ok(answer);
            }
        }
    }

    async fn run_planning(&mut self) -> Result<StepEvent> {
        let question = self.state.question().to_string();
        let plan = planner::build_plan(self.client, &question).await?;
        let steps = planner::parse_plan_steps(&plan).len();

        tracing::info!(steps, "plan created");

        self.state.plan = plan.clone();
        self.state.planned_steps = steps;
        self.state.push(Turn::Assistant {
            content: format!("Plan created:\n{plan}"),
            tool_calls: vec![],
        });
        self.state
            .push(Turn::User(format!("Now execute this plan to answer: {question}")));

        self.phase = Phase::AwaitingModel;
        Ok(StepEvent::Planned { plan, steps })
    }

    async fn run_model_turn(&mut self) -> Result<StepEvent> {
        let messages = self.context_messages();
        let reply = self.client.chat(&messages, &tools::tool_specs()).await?;

        self.state.push(Turn::Assistant {
            content: reply.content.clone(),
            tool_calls: reply.tool_calls.clone(),
        });

        let mut queue: VecDeque<ToolCall> = reply.tool_calls.into();
        if let Some(current) = queue.pop_front() {
            let mut names = vec![current.function.name.clone()];
            names.extend(queue.iter().map(|c| c.function.name.clone()));
            self.phase = Phase::DispatchingTool {
                current,
                rest: queue,
            };
            return Ok(StepEvent::ToolRequests { names });
        }

        // no tool requested: stop once a query has been executed, or when
        // the conversation outgrows the safety bound
        if self.state.tool_was_called(tools::EXECUTE_SQL)
            || self.state.turns.len() > self.config.max_turns
        {
            tracing::info!(turns = self.state.turns.len(), "terminating");
            self.phase = Phase::Terminated;
            return Ok(StepEvent::Done {
                answer: reply.content,
            });
        }

        // the model has not called any tool yet; ask again
        self.phase = Phase::AwaitingModel;
        Ok(StepEvent::ModelText {
            content: reply.content,
        })
    }

    async fn run_dispatch(
        &mut self,
        current: ToolCall,
        mut rest: VecDeque<ToolCall>,
    ) -> Result<StepEvent> {
        let name = current.function.name.clone();
        let content =
            tools::dispatch(&current, self.client, self.config, &self.state.db_path).await;

        self.state.push(Turn::Tool {
            name: name.clone(),
            content: content.clone(),
        });

        self.phase = match rest.pop_front() {
            Some(next) => Phase::DispatchingTool {
                current: next,
                rest,
            },
            None => Phase::AwaitingModel,
        };
        Ok(StepEvent::ToolResult { name, content })
    }

    /// System context plus the most recent conversation turns.
    fn context_messages(&self) -> Vec<ChatMessage> {
        let plan = if self.state.plan.is_empty() {
            "No plan yet"
        } else {
            self.state.plan.as_str()
        };
        let system = EXECUTION_TEMPLATE
            .replace("{db_path}", &self.state.db_path.display().to_string())
            .replace("{question}", self.state.question())
            .replace("{plan}", plan);

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(self.state.recent_messages(self.config.context_turns));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::example::create_example_database;
    use crate::llm::client::ToolSpec;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Scripted stand-in for the model: pops one canned reply per call.
    struct ScriptedClient {
        replies: Mutex<VecDeque<ChatMessage>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<ChatMessage>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }

        fn with_tool_calls(calls: Vec<ToolCall>) -> ChatMessage {
            let mut message = ChatMessage::assistant("");
            message.tool_calls = calls;
            message
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> crate::types::Result<ChatMessage> {
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ChatMessage::assistant("")))
        }
    }

    fn example_db() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.db");
        create_example_database(&path).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_planning_appends_plan_and_follow_up() {
        let (_dir, db) = example_db();
        let client = ScriptedClient::new(vec![ChatMessage::assistant(
            "1. List tables\n2. Run the query",
        )]);
        let config = Config::default();
        let mut orchestrator = Orchestrator::new(&client, &config, db, "How many customers?");

        let event = orchestrator.step().await.unwrap();

        match event {
            StepEvent::Planned { steps, .. } => assert_eq!(steps, 2),
            other => panic!("expected Planned, got {other:?}"),
        }
        let state = orchestrator.state();
        assert_eq!(state.turns.len(), 3);
        assert!(matches!(
            &state.turns[1],
            Turn::Assistant { content, .. } if content.starts_with("Plan created:")
        ));
        assert!(matches!(
            &state.turns[2],
            Turn::User(text) if text == "Now execute this plan to answer: How many customers?"
        ));
    }

    #[tokio::test]
    async fn test_terminates_after_sql_execution() {
        let (_dir, db) = example_db();
        let client = ScriptedClient::new(vec![
            ChatMessage::assistant("1. Run the query"),
            ScriptedClient::with_tool_calls(vec![ToolCall::new(
                tools::EXECUTE_SQL,
                json!({"sql_query": "SELECT COUNT(*) AS n FROM customers"}),
            )]),
            ChatMessage::assistant("There are 8 customers."),
        ]);
        let config = Config::default();
        let mut orchestrator = Orchestrator::new(&client, &config, db, "How many customers?");

        let answer = orchestrator.run().await.unwrap();

        assert_eq!(answer, "There are 8 customers.");
        assert!(orchestrator.is_terminated());
        assert!(orchestrator.state().tool_was_called(tools::EXECUTE_SQL));
    }

    #[tokio::test]
    async fn test_tool_result_appended_to_conversation() {
        let (_dir, db) = example_db();
        let client = ScriptedClient::new(vec![
            ChatMessage::assistant("1. List tables"),
            ScriptedClient::with_tool_calls(vec![ToolCall::new(tools::LIST_TABLES, json!({}))]),
        ]);
        let config = Config::default();
        let mut orchestrator = Orchestrator::new(&client, &config, db, "Show me all the tables");

        orchestrator.step().await.unwrap(); // planning
        orchestrator.step().await.unwrap(); // model requests list_tables
        let event = orchestrator.step().await.unwrap(); // dispatch

        match event {
            StepEvent::ToolResult { name, content } => {
                assert_eq!(name, tools::LIST_TABLES);
                assert!(content.contains("Table: customers"));
                assert!(content.contains("Table: products"));
                assert!(content.contains("Table: orders"));
            }
            other => panic!("expected ToolResult, got {other:?}"),
        }
        assert!(matches!(orchestrator.phase(), Phase::AwaitingModel));
    }

    #[tokio::test]
    async fn test_reasks_when_no_tool_called_yet() {
        let (_dir, db) = example_db();
        let client = ScriptedClient::new(vec![
            ChatMessage::assistant("1. Think about it"),
            ChatMessage::assistant("Let me think..."),
            ScriptedClient::with_tool_calls(vec![ToolCall::new(
                tools::EXECUTE_SQL,
                json!({"sql_query": "SELECT 1"}),
            )]),
            ChatMessage::assistant("done"),
        ]);
        let config = Config::default();
        let mut orchestrator = Orchestrator::new(&client, &config, db, "q");

        orchestrator.step().await.unwrap(); // planning
        let event = orchestrator.step().await.unwrap(); // text, no tool yet

        assert!(matches!(event, StepEvent::ModelText { .. }));
        assert!(!orchestrator.is_terminated());

        let answer = orchestrator.run().await.unwrap();
        assert_eq!(answer, "done");
    }

    #[tokio::test]
    async fn test_forced_termination_at_turn_bound() {
        let (_dir, db) = example_db();
        // the model never calls a tool
        let client = ScriptedClient::new(vec![]);
        let config = Config {
            max_turns: 5,
            ..Config::default()
        };
        let mut orchestrator = Orchestrator::new(&client, &config, db, "q");

        let answer = orchestrator.run().await.unwrap();

        assert_eq!(answer, "");
        assert!(orchestrator.is_terminated());
        assert!(orchestrator.state().turns.len() > config.max_turns);
        assert!(!orchestrator.state().tool_was_called(tools::EXECUTE_SQL));
    }

    #[tokio::test]
    async fn test_multiple_tool_calls_dispatch_in_order() {
        let (_dir, db) = example_db();
        let client = ScriptedClient::new(vec![
            ChatMessage::assistant("1. Look then query"),
            ScriptedClient::with_tool_calls(vec![
                ToolCall::new(tools::LIST_TABLES, json!({})),
                ToolCall::new(
                    tools::EXECUTE_SQL,
                    json!({"sql_query": "SELECT COUNT(*) FROM orders"}),
                ),
            ]),
            ChatMessage::assistant("50 orders."),
        ]);
        let config = Config::default();
        let mut orchestrator = Orchestrator::new(&client, &config, db, "How many orders?");

        orchestrator.step().await.unwrap(); // planning
        let event = orchestrator.step().await.unwrap();
        match event {
            StepEvent::ToolRequests { names } => {
                assert_eq!(names, vec![tools::LIST_TABLES, tools::EXECUTE_SQL]);
            }
            other => panic!("expected ToolRequests, got {other:?}"),
        }

        let first = orchestrator.step().await.unwrap();
        assert!(matches!(first, StepEvent::ToolResult { ref name, .. } if name == tools::LIST_TABLES));
        let second = orchestrator.step().await.unwrap();
        assert!(matches!(second, StepEvent::ToolResult { ref name, .. } if name == tools::EXECUTE_SQL));

        let answer = orchestrator.run().await.unwrap();
        assert_eq!(answer, "50 orders.");
    }
}
