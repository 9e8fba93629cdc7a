mod app;
mod auth;
mod config;
mod context;
mod middleware;
mod state;
mod students;
mod telemetry;
#[cfg(test)]
mod test_support;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = telemetry::init(&config.log)?;
    tracing::info!("setting up students api");

    let app_state = AppState::init(config).await?;
    let config = app_state.config.clone();
    let shutdown = app_state.shutdown.clone();

    let app = app::build_app(app_state);
    if let Err(e) = app::serve(app, &config, shutdown).await {
        tracing::error!(error = %e, "failed to serve the application");
        return Err(e);
    }

    tracing::info!("server stopped");
    Ok(())
}
