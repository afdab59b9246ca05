//! Contains all the routes that this application can handle.

mod api;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::{web::Error, AppState};

/// All the routes of the server. Anything else is a JSON 404.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(app_state))
        .fallback(route_not_found)
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/kenobi", get(api::kenobi))
        .route("/rate", get(api::rate))
        .route("/subscribe", post(api::subscribe))
        .route("/sendEmails", post(api::send_emails))
        .with_state(app_state)
}

async fn route_not_found(uri: Uri) -> Error {
    Error::RouteNotFound(uri.path().to_string())
}
