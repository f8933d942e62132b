//! AgentSQL CLI: ask questions about a SQLite database in natural language.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use agentsql::agent::{Orchestrator, StepEvent};
use agentsql::config::{self, Config};
use agentsql::db;
use agentsql::llm::{ChatClient, OllamaClient};

#[derive(Parser)]
#[command(name = "agentsql")]
#[command(about = "Natural language to SQL assistant", long_about = None)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, default_value = "example.db")]
    db: PathBuf,

    /// Question to ask about the database
    #[arg(long)]
    question: Option<String>,

    /// Run in interactive mode
    #[arg(long)]
    interactive: bool,

    /// Model identifier
    #[arg(long, env = "AGENTSQL_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Chat endpoint base URL
    #[arg(long, env = "AGENTSQL_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if !cli.db.exists() {
        println!(
            "{} Database '{}' not found, creating example database...",
            "→".cyan(),
            cli.db.display()
        );
        db::create_example_database(&cli.db)?;
        println!(
            "{} Example database created at '{}'\n",
            "✓".green(),
            cli.db.display()
        );
    }

    let config = Config {
        base_url: cli.base_url.clone(),
        model: cli.model.clone(),
        ..Config::default()
    };
    let client = OllamaClient::new(&config.base_url, &config.model);

    if cli.interactive {
        run_interactive(&client, &config, &cli.db).await;
    } else if let Some(question) = &cli.question {
        run_question(&client, &config, &cli.db, question).await?;
    } else {
        print_usage(&cli.db);
    }

    Ok(())
}

/// Drive one question through the orchestrator, narrating each transition.
async fn run_question(
    client: &dyn ChatClient,
    config: &Config,
    db: &Path,
    question: &str,
) -> anyhow::Result<()> {
    println!("\n{}", "=".repeat(60));
    println!("Question: {}", question.bright_white());
    println!("{}\n", "=".repeat(60));

    let mut orchestrator = Orchestrator::new(client, config, db.to_path_buf(), question);

    loop {
        match orchestrator.step().await? {
            StepEvent::Planned { plan, .. } => {
                println!("{} Planning:\n{}\n", "→".cyan(), plan);
            }
            StepEvent::ModelText { content } => {
                if !content.is_empty() {
                    println!("{} {}\n", "•".cyan(), content);
                }
            }
            StepEvent::ToolRequests { names } => {
                println!("{} Executing tools:", "→".cyan());
                for name in names {
                    println!("  - {name}");
                }
            }
            StepEvent::ToolResult { name, content } => {
                let preview: String = content.chars().take(500).collect();
                let ellipsis = if content.chars().count() > 500 { "..." } else { "" };
                println!(
                    "{} {} result:\n{}{}\n",
                    "✓".green(),
                    name,
                    preview.dimmed(),
                    ellipsis
                );
            }
            StepEvent::Done { answer } => {
                if !answer.is_empty() {
                    println!("{} {}", "✓".green(), answer.bright_white());
                }
                break;
            }
        }
    }

    println!("\n{}\n", "=".repeat(60));
    Ok(())
}

/// REPL loop reading questions until quit/exit/q.
async fn run_interactive(client: &dyn ChatClient, config: &Config, db: &Path) {
    println!("\n{} AgentSQL - Interactive Mode", "→".cyan());
    println!("{}", "=".repeat(60));
    println!("Ask questions about your database in natural language.");
    println!("Type 'quit' or 'exit' to stop.\n");

    let stdin = io::stdin();
    loop {
        print!("You: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let question = line.trim();
        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("\nGoodbye!\n");
            break;
        }
        if question.is_empty() {
            continue;
        }

        if let Err(e) = run_question(client, config, db, question).await {
            eprintln!("{} {e}\n", "✗".red());
        }
    }
}

/// Default mode: show usage and example questions.
fn print_usage(db: &Path) {
    println!("\n{} AgentSQL - Natural Language to SQL Assistant", "→".cyan());
    println!("{}", "=".repeat(60));
    println!("\nUsing database: {}\n", db.display());

    let examples = [
        "What tables are in the database?",
        "Show me all customers",
        "How many orders do we have?",
    ];
    println!("Example questions:");
    for (i, q) in examples.iter().enumerate() {
        println!("  {}. {q}", i + 1);
    }

    println!("\nUsage:");
    println!("  agentsql --question 'Your question here'");
    println!("  agentsql --interactive");
    println!("  agentsql --db path/to/your.db --interactive\n");
}
