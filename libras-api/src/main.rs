//! libras-api - Libras learning backend service

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use libras_api::api::auth_middleware::AuthSettings;
use libras_api::services::chat_client::LlmClient;
use libras_api::services::image_client::FluxImageClient;
use libras_api::services::image_fetcher::BoundedImageFetcher;
use libras_api::AppState;
use libras_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is a development convenience; absence is fine
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting libras-api backend");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Configuration is resolved once here and handed to constructors;
    // nothing reads the environment after startup
    let config = Config::from_env()?;

    let db_pool = libras_api::db::init_database_pool(Path::new(&config.database_path)).await?;
    info!("Database connection established: {}", config.database_path);

    let text_model = Arc::new(LlmClient::new(config.llm.clone())?);
    let image_provider = Arc::new(FluxImageClient::new(config.image.clone())?);
    let image_fetcher = Arc::new(BoundedImageFetcher::new(
        image_provider,
        config.image.concurrency,
        config.image.max_attempts,
    ));
    let auth = Arc::new(AuthSettings::new(&config.auth)?);

    let state = AppState::new(db_pool, text_model, image_fetcher);
    let app = libras_api::build_router(state, auth);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
