//! Planning phase: a one-shot numbered plan from the model.

use crate::llm::client::{ChatClient, ChatMessage};
use crate::types::Result;

/// Instruction template for the planning call. `{question}` is replaced
/// with the user's question.
const PLANNING_TEMPLATE: &str = r#"You are a SQL assistant. Analyze the user's question and create a step-by-step plan.

User Question: {question}

Create a clear, numbered plan with 2-5 steps. Common steps include:
1. List database tables to understand schema
2. Convert natural language to SQL
3. Execute the SQL query
4. Visualize the results (if appropriate)

Respond with ONLY the numbered plan, nothing else.

Plan:"#;

/// Ask the model for a numbered plan for the question.
pub async fn build_plan(client: &dyn ChatClient, question: &str) -> Result<String> {
    let prompt = PLANNING_TEMPLATE.replace("{question}", question);
    let response = client.chat(&[ChatMessage::user(prompt)], &[]).await?;
    Ok(response.content.trim().to_string())
}

/// Lines that start with a digit are plan steps; everything else is
/// commentary. Steps keep their original order.
pub fn parse_plan_steps(plan: &str) -> Vec<String> {
    plan.lines()
        .map(str::trim)
        .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_only_numbered_lines_in_order() {
        let plan = "Here is my plan:\n\
                    1. List database tables\n\
                    Some commentary in between\n\
                    2. Convert the question to SQL\n\
                    \n\
                    3. Execute the query\n\
                    Done.";

        let steps = parse_plan_steps(plan);

        assert_eq!(
            steps,
            vec![
                "1. List database tables",
                "2. Convert the question to SQL",
                "3. Execute the query",
            ]
        );
    }

    #[test]
    fn test_parse_trims_indented_steps() {
        let plan = "   1. First\n\t2. Second";

        assert_eq!(parse_plan_steps(plan), vec!["1. First", "2. Second"]);
    }

    #[test]
    fn test_parse_without_numbered_lines_is_empty() {
        assert!(parse_plan_steps("no plan here\njust prose").is_empty());
        assert!(parse_plan_steps("").is_empty());
    }
}
