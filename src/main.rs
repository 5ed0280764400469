mod config;
mod content;
mod error;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::store::{ContentApi, HttpPageStore};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let api = ContentApi::from_config(&config).expect("content API client init failed");
    let store = Arc::new(HttpPageStore::new(api.clone()));
    let port = config.port;

    tracing::info!(
        content_api = %config.content_api_url,
        debounce_ms = u64::try_from(config.autosave.debounce.as_millis()).unwrap_or(u64::MAX),
        max_retries = config.autosave.max_retries,
        "editor configured"
    );

    let state = state::AppState::new(config, api, store);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "pagecraft listening");
    axum::serve(listener, app).await.expect("server failed");
}
