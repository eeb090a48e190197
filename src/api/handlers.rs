use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::view::{ViewState, HEADING};
use crate::{AppState, Session};

use super::models::ErrorResponse;

pub async fn analysis_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let view_state = settle_mount(&state, &headers).await;
    let page = format!(
        concat!(
            "<!doctype html><html><head><meta charset=\"utf-8\">",
            "<title>{}</title></head><body>{}</body></html>"
        ),
        HEADING,
        view_state.render()
    );

    (status_for(&view_state), Html(page)).into_response()
}

pub async fn analysis_state(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let view_state = settle_mount(&state, &headers).await;
    (status_for(&view_state), Json(view_state)).into_response()
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "route not found".to_string(),
        }),
    )
        .into_response()
}

async fn settle_mount(state: &AppState, headers: &HeaderMap) -> ViewState {
    let mut mounted = state.view.mount(Session::from_headers(headers));
    mounted.settled().await
}

fn status_for(view_state: &ViewState) -> StatusCode {
    match view_state {
        ViewState::Ready(_) => StatusCode::OK,
        ViewState::Error { .. } => StatusCode::BAD_GATEWAY,
        ViewState::Loading => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
