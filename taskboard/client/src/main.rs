use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use taskboard_client::{
    DeleteOutcome, HttpTaskApi, NewTask, TaskBoard, TaskId, TaskPatch, TaskStatus,
};

#[derive(Parser, Debug)]
#[command(about = "List, create, edit and delete tasks")]
struct Cli {
    /// Base URL of the task server
    #[arg(long, env = "TASKBOARD_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Show every task
    List,
    /// Create a task
    Add {
        name: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
    },
    /// Change some fields of a task
    Edit {
        id: TaskId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
    },
    /// Permanently delete a task
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Reads a y/N answer from stdin.
fn ask_on_terminal(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();

    let mut board = TaskBoard::new(HttpTaskApi::new(args.server_url));
    let tasks = board.load().await?;

    match args.command {
        Commands::List => {
            if tasks.is_empty() {
                println!("No tasks yet. Create one with `taskboard add <name>`.");
            }
            for task in tasks {
                println!("{task}");
            }
        }
        Commands::Add { name, text, status } => {
            let task = board.create(NewTask { name, text, status }).await?;
            println!("Created {task}");
        }
        Commands::Edit {
            id,
            name,
            text,
            status,
        } => {
            let patch = TaskPatch { name, text, status };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change; pass --name, --text or --status");
            }
            let task = board.update(id, patch).await?;
            println!("Updated {task}");
        }
        Commands::Delete { id, yes } => {
            let outcome = if yes {
                board.delete(id, &|_: &str| true).await?
            } else {
                board.delete(id, &ask_on_terminal).await?
            };
            match outcome {
                DeleteOutcome::Deleted => println!("Deleted {id}"),
                DeleteOutcome::Cancelled => println!("Cancelled"),
            }
        }
    }
    Ok(())
}
