//! Tool declarations and dispatch.
//!
//! The four tools are declared to the model with JSON-Schema parameters.
//! Dispatch parses the model-provided arguments and adapts each tool's
//! typed result to text, because the consumer on the other side of the
//! boundary only reads text: failures come back as error-prefixed strings
//! the model can react to on its next turn.

use std::path::{Path, PathBuf};

use serde_json::{json, Value as JsonValue};

use crate::config::Config;
use crate::db::executor;
use crate::llm::client::{ChatClient, ToolCall, ToolSpec};
use crate::llm::translator;
use crate::viz;

pub const LIST_TABLES: &str = "list_tables";
pub const EXECUTE_SQL: &str = "execute_sql";
pub const NL_TO_SQL: &str = "nl_to_sql";
pub const VISUALIZE_DATA: &str = "visualize_data";

/// Declarations for the four tools, advertised on every execution turn.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::function(
            LIST_TABLES,
            "List all tables in the database with their column names and types.",
            json!({
                "type": "object",
                "properties": {
                    "db_path": {"type": "string", "description": "Path to the SQLite database file"}
                },
                "required": ["db_path"]
            }),
        ),
        ToolSpec::function(
            EXECUTE_SQL,
            "Execute a SQL query and return the results as text.",
            json!({
                "type": "object",
                "properties": {
                    "db_path": {"type": "string", "description": "Path to the SQLite database file"},
                    "sql_query": {"type": "string", "description": "The SQL query to execute"}
                },
                "required": ["db_path", "sql_query"]
            }),
        ),
        ToolSpec::function(
            NL_TO_SQL,
            "Convert a natural language question into a SQL query using the database schema.",
            json!({
                "type": "object",
                "properties": {
                    "question": {"type": "string", "description": "The natural language question to convert"},
                    "db_schema": {"type": "string", "description": "The database schema information"},
                    "db_path": {"type": "string", "description": "Path to the database (included for context)"}
                },
                "required": ["question", "db_schema"]
            }),
        ),
        ToolSpec::function(
            VISUALIZE_DATA,
            "Execute a SQL query and create a chart of the results. \
             Chart type is one of: auto, bar, line, pie, scatter, heatmap.",
            json!({
                "type": "object",
                "properties": {
                    "db_path": {"type": "string", "description": "Path to the SQLite database file"},
                    "sql_query": {"type": "string", "description": "The SQL query to execute"},
                    "chart_type": {"type": "string", "description": "Type of chart (auto, bar, line, pie, scatter, heatmap)"}
                },
                "required": ["db_path", "sql_query"]
            }),
        ),
    ]
}

/// Dispatch one tool call and return its text result.
///
/// The session database path is used when the model omits `db_path`.
pub async fn dispatch(
    call: &ToolCall,
    client: &dyn ChatClient,
    config: &Config,
    session_db: &Path,
) -> String {
    let args = &call.function.arguments;
    let db_path = str_arg(args, "db_path")
        .map(PathBuf::from)
        .unwrap_or_else(|| session_db.to_path_buf());

    tracing::info!(tool = %call.function.name, db = %db_path.display(), "dispatching tool");

    match call.function.name.as_str() {
        LIST_TABLES => executor::list_tables(&db_path)
            .unwrap_or_else(|e| format!("Error listing tables: {e}")),

        EXECUTE_SQL => match str_arg(args, "sql_query") {
            Some(sql) => executor::execute_sql(&db_path, &sql)
                .unwrap_or_else(|e| format!("Error executing SQL: {e}")),
            None => "Error executing SQL: missing sql_query argument".to_string(),
        },

        NL_TO_SQL => {
            let question = match str_arg(args, "question") {
                Some(q) => q,
                None => return "Error converting NL to SQL: missing question argument".to_string(),
            };
            // fall back to a fresh schema report when the model skipped it
            let schema = match str_arg(args, "db_schema") {
                Some(s) => s,
                None => match executor::list_tables(&db_path) {
                    Ok(s) => s,
                    Err(e) => return format!("Error converting NL to SQL: {e}"),
                },
            };
            match translator::nl_to_sql(client, &question, &schema).await {
                Ok(sql) => sql,
                Err(e) => format!("Error converting NL to SQL: {e}"),
            }
        }

        VISUALIZE_DATA => match str_arg(args, "sql_query") {
            Some(sql) => {
                let chart_type = str_arg(args, "chart_type").unwrap_or_else(|| "auto".to_string());
                viz::visualize_data(&db_path, &sql, &chart_type, &config.viz_dir)
                    .unwrap_or_else(|e| format!("Error creating visualization: {e}"))
            }
            None => "Error creating visualization: missing sql_query argument".to_string(),
        },

        other => format!("Error: unknown tool '{other}'"),
    }
}

fn str_arg(args: &JsonValue, key: &str) -> Option<String> {
    args.get(key).and_then(JsonValue::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::example::create_example_database;
    use crate::llm::client::{ChatMessage, ToolSpec};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct NoopClient;

    #[async_trait]
    impl ChatClient for NoopClient {
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> crate::types::Result<ChatMessage> {
            Ok(ChatMessage::assistant("SELECT 1"))
        }
    }

    fn example_db() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.db");
        create_example_database(&path).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_dispatch_list_tables() {
        let (_dir, db) = example_db();
        let call = ToolCall::new(LIST_TABLES, json!({"db_path": db.to_str().unwrap()}));

        let out = dispatch(&call, &NoopClient, &Config::default(), &db).await;

        assert!(out.contains("Table: customers"));
    }

    #[tokio::test]
    async fn test_dispatch_converts_sql_errors_to_text() {
        let (_dir, db) = example_db();
        let call = ToolCall::new(
            EXECUTE_SQL,
            json!({"db_path": db.to_str().unwrap(), "sql_query": "SELECT * FROM missing"}),
        );

        let out = dispatch(&call, &NoopClient, &Config::default(), &db).await;

        assert!(out.starts_with("Error executing SQL:"));
    }

    #[tokio::test]
    async fn test_dispatch_falls_back_to_session_db_path() {
        let (_dir, db) = example_db();
        let call = ToolCall::new(
            EXECUTE_SQL,
            json!({"sql_query": "SELECT COUNT(*) AS n FROM customers"}),
        );

        let out = dispatch(&call, &NoopClient, &Config::default(), &db).await;

        assert!(out.starts_with("Query Results (1 rows):"));
        assert!(out.contains('8'));
    }

    #[tokio::test]
    async fn test_dispatch_missing_argument_is_error_text() {
        let (_dir, db) = example_db();
        let call = ToolCall::new(EXECUTE_SQL, json!({}));

        let out = dispatch(&call, &NoopClient, &Config::default(), &db).await;

        assert_eq!(out, "Error executing SQL: missing sql_query argument");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let (_dir, db) = example_db();
        let call = ToolCall::new("drop_everything", json!({}));

        let out = dispatch(&call, &NoopClient, &Config::default(), &db).await;

        assert_eq!(out, "Error: unknown tool 'drop_everything'");
    }

    #[test]
    fn test_tool_specs_cover_the_four_tools() {
        let specs = tool_specs();
        let names: Vec<&str> = specs.iter().map(|s| s.function.name.as_str()).collect();

        assert_eq!(names, vec![LIST_TABLES, EXECUTE_SQL, NL_TO_SQL, VISUALIZE_DATA]);
    }
}
