pub mod analysis;
pub mod api;
pub mod config;
mod error;
pub mod mount;
pub mod profile;
mod session;
pub mod view;

use std::sync::Arc;

use axum::Router;
use tracing::info;

pub use analysis::{AnalysisRequest, AnalysisRequester, AnalysisResult, HttpAnalysisClient};
pub use config::AppConfig;
pub use error::FlowError;
pub use mount::{AnalysisView, Mounted};
pub use profile::{HttpProfileFetcher, LoanApplication, ProfileFetcher, Scalar, UserProfile};
pub use session::Session;
pub use view::ViewState;

#[derive(Clone)]
pub struct AppState {
    pub view: Arc<AnalysisView>,
}

impl AppState {
    pub fn new(view: AnalysisView) -> Self {
        Self {
            view: Arc::new(view),
        }
    }

    /// Wire the HTTP-backed profile fetcher and analysis client from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::new();
        let profiles = HttpProfileFetcher::new(client.clone(), &config.profile_url);
        let analysis = HttpAnalysisClient::new(client, &config.analysis_url);

        Self::new(AnalysisView::new(Arc::new(profiles), Arc::new(analysis)))
    }
}

pub fn build_app(state: AppState) -> Router {
    api::router(state)
}

pub async fn run_server(app: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "serving loan analysis view");

    axum::serve(listener, app).await
}
