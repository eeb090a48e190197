mod handlers;
mod models;

use axum::{routing::get, Router};

use crate::AppState;

pub use handlers::{analysis_page, analysis_state, not_found};
pub use models::ErrorResponse;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analysis", get(analysis_page))
        .route("/analysis/state", get(analysis_state))
        .fallback(not_found)
        .with_state(state)
}
