use storybook_illustrator::{routes::create_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storybook_illustrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storybook illustrator");

    // Fails fast when the OpenAI key is missing
    let config = Config::load()?;

    tracing::info!(
        "Loaded configuration - Server: {}:{}, output: {} -> {}",
        config.server.host,
        config.server.port,
        config.output.dir.display(),
        config.output.public_prefix
    );

    let state = AppState::new(config.clone())?;

    tokio::fs::create_dir_all(&config.output.dir).await?;

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
