//! Todo Server
//!
//! Serves the todo CRUD API over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # PostgreSQL-backed (default DATABASE_URL points at localhost)
//! cargo run --bin todo-server
//!
//! # No database
//! DATABASE_URL=memory cargo run --bin todo-server
//! ```

use todo_web::{AppState, Config, build_router, connect_repository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_web=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        host = %config.host,
        port = config.port,
        in_memory = config.database.is_in_memory(),
        "Configuration loaded"
    );

    let repository = connect_repository(&config.database).await?;
    let app = build_router(AppState::new(repository));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Todo server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
