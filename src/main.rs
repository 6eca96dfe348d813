mod agent;
mod calculator;
mod cli;
mod config;
mod llm;
mod retriever;
mod utils;
mod vector_db;

use agent::{Agent, Route};
use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use llm::ChatBackend;
use retriever::Retriever;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_documents(retriever: &mut Retriever, config: &Config) {
    let Some(docs_dir) = &config.docs_dir else {
        retriever.seed_defaults();
        return;
    };

    info!("Loading documents from '{}'", docs_dir.display());
    match retriever.load_directory(docs_dir, config.chunk_chars) {
        Ok(chunks) => info!(chunks, documents = retriever.len(), "Indexed corpus"),
        Err(e) => warn!("Failed to load documents: {:#}", e),
    }
    if retriever.is_empty() {
        warn!("No documents indexed; chat turns will be sent without context");
    }
}

async fn answer(agent: &Agent, input: &str) -> Result<String, llm::ProviderError> {
    let span = info_span!(
        "turn",
        id = %uuid::Uuid::new_v4(),
        route = Route::parse(input).name()
    );
    agent.reply(input).instrument(span).await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so replies on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_playground=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env()?);
    info!(
        provider = config.provider.as_str(),
        model = config.model(),
        top_k = config.top_k,
        "Loaded configuration"
    );

    let mut retriever = Retriever::new();
    load_documents(&mut retriever, &config);

    let agent = Agent::new(ChatBackend::from_config(&config), retriever, config.top_k);

    if let Some(prompt) = &cli.prompt {
        println!("{}", answer(&agent, prompt).await?);
        return Ok(());
    }

    println!(
        "Provider: {}. Type a question (or 'exit'). Try: 'calc: 2 + 2' or 'search: rag'.",
        agent.backend().name()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        match answer(&agent, &line).await {
            Ok(reply) => println!("agent> {}\n", reply),
            Err(e) => {
                error!("Chat backend failed: {}", e);
                println!("agent error: {}\n", e);
            }
        }
    }

    Ok(())
}
