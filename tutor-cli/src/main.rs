//! Tutor CLI — answers questions from a folder of course material.
//!
//! Commands:
//! - `prompt` — show how a question is routed and the instruction it produces
//! - `ask`    — answer one question
//! - `chat`   — interactive session

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};
use tutor_rag::openai::OpenAiCompletion;
use tutor_rag::{ContextBuilder, DirectoryLoader, TurnAction, TutorConfig, TutorSession};

#[derive(Parser)]
#[command(name = "tutor", about = "Course-material tutor backed by a language model", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file overriding the default configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory with the extracted course documents
    #[arg(short, long, global = true, default_value = ".")]
    docs: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the routing decision and instruction for a question (no network)
    Prompt {
        /// The question
        question: String,
    },

    /// Answer a single question
    Ask {
        /// The question
        question: String,

        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Base URL of an OpenAI-compatible server
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Start an interactive session (`/clear` resets the chat, `/quit` exits)
    Chat {
        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Base URL of an OpenAI-compatible server
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => TutorConfig::from_json_file(path)?,
        None => TutorConfig::default(),
    };
    let builder = Arc::new(ContextBuilder::builder().config(config).build()?);
    let documents = DirectoryLoader::new(builder.config().max_pdf_pages)
        .load(&cli.docs)
        .with_context(|| format!("loading course material from {}", cli.docs.display()))?;
    let session = TutorSession::new(builder.clone(), documents);

    match cli.command {
        Commands::Prompt { question } => print_prompt(&builder, &session, &question)?,
        Commands::Ask { question, api_key, base_url } => {
            let completion = completion(api_key, base_url)?;
            let mut session = session;
            println!("{}", session.ask(&question, &completion).await);
        }
        Commands::Chat { api_key, base_url } => {
            let completion = completion(api_key, base_url)?;
            chat(session, &completion, &cli.docs).await?;
        }
    }

    Ok(())
}

fn completion(api_key: String, base_url: Option<String>) -> Result<OpenAiCompletion> {
    let service = OpenAiCompletion::new(api_key)?;
    Ok(match base_url {
        Some(url) => service.with_base_url(url),
        None => service,
    })
}

fn print_prompt(builder: &ContextBuilder, session: &TutorSession, question: &str) -> Result<()> {
    let turn = builder.prepare(session.corpus(), question);
    println!("label: {}", turn.label.as_str());
    match &turn.action {
        TurnAction::Reply { text } => println!("reply (no model call):\n{text}"),
        TurnAction::Prompt(context) => {
            println!("policy: {:?}", context.policy);
            println!(
                "tokens: {} of {} available",
                context.instruction_tokens,
                context.budget.available()
            );
            println!("cited: {}", context.cited_documents().join(", "));
            println!("instruction:\n{}", context.instruction);
        }
    }
    Ok(())
}

async fn chat(mut session: TutorSession, completion: &OpenAiCompletion, docs: &Path) -> Result<()> {
    info!(
        documents = session.corpus().documents().len(),
        chunks = session.corpus().chunks().len(),
        docs = %docs.display(),
        "course material loaded"
    );
    if let Some(greeting) = session.history().first() {
        println!("{}", greeting.content);
    }

    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(question) {
            debug!(error = %e, "failed to record line history");
        }

        match question {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear_history();
                if let Some(greeting) = session.history().first() {
                    println!("{}", greeting.content);
                }
            }
            _ => println!("tutor> {}", session.ask(question, completion).await),
        }
    }
    Ok(())
}
