//! Natural language to SQL conversion.

use crate::llm::client::{ChatClient, ChatMessage};
use crate::types::Result;

/// Instruction template for the translation call. `{schema}` is replaced
/// with the textual schema report before sending.
const NL_TO_SQL_SYSTEM: &str = r#"You are a SQL expert. Convert the user's natural language question into a valid SQL query.

Database Schema:
{schema}

Rules:
1. Generate ONLY the SQL query, no explanations
2. Use proper SQL syntax for SQLite
3. Return only SELECT statements
4. Do not include markdown code blocks or formatting
5. Ensure the query is safe and read-only

Example:
Question: "Show me all customers"
SQL: SELECT * FROM customers

Question: "How many orders were placed last month?"
SQL: SELECT COUNT(*) FROM orders WHERE created_at >= date('now', '-1 month')"#;

/// Convert a natural language question to a SQL query.
///
/// The returned text is not validated: trust in the model's compliance with
/// the SELECT-only instruction is total.
///
/// # Errors
///
/// Returns `AgentError::Model` / `AgentError::Http` if the model call fails.
pub async fn nl_to_sql(
    client: &dyn ChatClient,
    question: &str,
    db_schema: &str,
) -> Result<String> {
    let system = NL_TO_SQL_SYSTEM.replace("{schema}", db_schema);
    let messages = [ChatMessage::system(system), ChatMessage::user(question)];

    let response = client.chat(&messages, &[]).await?;

    Ok(strip_sql_fences(&response.content))
}

/// Extract the SQL payload from a model response.
///
/// Strips a fenced code block if the model ignored the no-markdown
/// instruction: a ```sql-tagged fence wins, then any fence, otherwise the
/// full trimmed response is used as-is.
pub fn strip_sql_fences(text: &str) -> String {
    let text = text.trim();

    if let Some(idx) = text.find("```sql") {
        let after = &text[idx + "```sql".len()..];
        let inner = after.split("```").next().unwrap_or(after);
        return inner.trim().to_string();
    }

    if let Some(idx) = text.find("```") {
        let after = &text[idx + 3..];
        let inner = after.split("```").next().unwrap_or(after);
        return inner.trim().to_string();
    }

    text.to_string()
}
