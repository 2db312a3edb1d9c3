//! HTTP trigger for a generation run.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use theme_tokens_core::{generate_tokens, DesignTokens};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::RuntimeConfig;

pub const GENERATE_ROUTE: &str = "/api/tokens/generate";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(GENERATE_ROUTE, get(generate).post(generate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reads the token file named by the configuration and writes every artifact
/// into the configured directory.
pub fn run_generation(config: &RuntimeConfig) -> anyhow::Result<Vec<PathBuf>> {
    let tokens = DesignTokens::load(&config.tokens_file)
        .with_context(|| format!("loading tokens from {}", config.tokens_file.display()))?;
    let written = generate_tokens(&tokens, &config.tokens_dir, config.silent)
        .with_context(|| format!("generating tokens into {}", config.tokens_dir.display()))?;
    Ok(written)
}

async fn generate(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let config = state.config.clone();
    let written = tokio::task::spawn_blocking(move || run_generation(&config))
        .await
        .context("generation task failed")??;
    info!(files = written.len(), "generated design tokens");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn serve(config: RuntimeConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!("listening on {}", listener.local_addr()?);
    let state = AppState {
        config: Arc::new(config),
    };
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("token generation failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", self.0)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
