use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ChatSession, ClientConfig, Theme};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::oneshot,
    task::JoinSet,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod orchestration;
mod render;

use commands::{parse_line, ChatCommand};

/// Chat with a document through a remote retrieval service.
#[derive(Parser, Debug)]
#[command(name = "rag-chat")]
struct Args {
    /// TOML config file (defaults to ./rag-chat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Service root; both endpoints are derived from it
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    ingest_url: Option<String>,
    #[arg(long)]
    query_url: Option<String>,
    /// classic or terminal
    #[arg(long)]
    theme: Option<Theme>,
    /// Document to ingest at startup
    #[arg(long)]
    upload: Option<PathBuf>,
}

impl Args {
    fn resolve_config(&self) -> Result<ClientConfig> {
        let mut builder = ClientConfig::load(self.config.as_deref())?;
        if let Some(v) = &self.base_url {
            builder = builder.base_url(v);
        }
        if let Some(v) = &self.ingest_url {
            builder = builder.ingestion_endpoint(v);
        }
        if let Some(v) = &self.query_url {
            builder = builder.query_endpoint(v);
        }
        if let Some(theme) = self.theme {
            builder = builder.theme(theme);
        }
        builder.build().context("invalid client configuration")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    info!(
        ingestion = %config.ingestion_endpoint,
        query = %config.query_endpoint,
        theme = %config.theme,
        "starting session"
    );

    let session = ChatSession::new(&config);
    println!("== {} ==  (/help for commands)", config.theme.title());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let renderer = tokio::spawn(render::run(
        session.clone(),
        session.subscribe_events(),
        shutdown_rx,
    ));

    let mut tasks = JoinSet::new();
    if let Some(path) = args.upload {
        orchestration::dispatch(&session, ChatCommand::Upload(path), &mut tasks).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_line(&line) {
            None => {}
            Some(ChatCommand::Quit) => break,
            Some(command) => orchestration::dispatch(&session, command, &mut tasks).await,
        }
        while let Some(joined) = tasks.try_join_next() {
            if let Err(err) = joined {
                warn!(error = %err, "operation task failed");
            }
        }
    }

    // Requests cannot be cancelled; let outstanding ones settle before exiting.
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "operation task failed");
        }
    }
    let _ = shutdown_tx.send(());
    renderer.await.context("renderer task failed")?;

    Ok(())
}
