use std::time::Instant;

use ladle_api::{config::Config, routes::create_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ladle_api=info,tower_http=info".into()),
        )
        .init();

    // Build the store once; serving without it is not an option.
    let start = Instant::now();
    let state = AppState::load(&config)?;
    tracing::info!(
        users = state.store.user_count(),
        recipes = state.recipes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Model store loaded"
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
