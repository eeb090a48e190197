use anyhow::Context;
use loan_analysis_view::{build_app, run_server, AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        profile_url = %config.profile_url,
        analysis_url = %config.analysis_url,
        "loaded configuration"
    );

    let app = build_app(AppState::from_config(&config));
    run_server(app, config.port)
        .await
        .with_context(|| format!("server on port {} failed", config.port))
}
