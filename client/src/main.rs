//! Todo terminal client
//!
//! # Usage
//!
//! ```bash
//! # Against a local server
//! cargo run --bin todo
//!
//! # Elsewhere
//! TODO_API_URL=http://todo.internal:5000/api cargo run --bin todo
//! ```

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use todo_client::{Cli, Flow, HttpTodoApi, Intent, TodoApp};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they do not interleave with the screen
    let default_filter = if cli.verbose { "todo_client=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(api_url = %cli.api_url, "Starting todo client");

    let api = HttpTodoApi::new(cli.api_url.clone());
    let mut app = TodoApp::new(Arc::new(api)).with_timeout(cli.timeout());
    if let Err(error) = app.load().await {
        tracing::warn!(%error, "Initial load did not finish");
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let screen = app.screen().await;
        stdout
            .write_all(format!("\n{screen}> ").as_bytes())
            .await
            .context("Failed to write to stdout")?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        let intent = match line.parse::<Intent>() {
            Ok(intent) => intent,
            Err(error) => {
                stdout.write_all(format!("{error}\n").as_bytes()).await?;
                continue;
            },
        };

        match app.dispatch(intent).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {},
            Err(error) => stdout.write_all(format!("{error}\n").as_bytes()).await?,
        }
    }

    Ok(())
}
