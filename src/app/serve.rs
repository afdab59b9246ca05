use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{info, Span};

use crate::{
    web::{midware, routes::routes, REQUEST_ID_HEADER},
    App, AppState,
};

/// Serves the app until the process receives Ctrl-C.
///
/// In-flight requests are allowed to finish, so a subscribe that already holds the store lock
/// completes its write and a running batch completes its sends before the listener closes.
pub async fn serve(app: App) -> Result<(), ServeError> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, build_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{:<20} - Server stopped", "serve");
    Ok(())
}

/// The routes wrapped in the request-id, tracing and error mapping layers.
pub fn build_router(app_state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    routes(app_state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            .layer(build_trace_layer())
            // Responses travel the stack bottom-up: the id is already propagated
            // when the mapper turns a `web::Error` into its JSON body.
            .layer(middleware::map_response(midware::response_mapper))
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

async fn shutdown_signal() {
    if let Err(er) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {er}");
        // Without a signal handler there is nothing to wait for, keep serving.
        std::future::pending::<()>().await;
    }
    info!("{:<20} - Ctrl-C received, shutting down", "serve");
}

fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_request(|req: &Request<Body>, _s: &Span| info!("START @ {}", req.uri()))
        .on_response(log_response)
}

fn request_span(req: &Request<Body>) -> Span {
    let req_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .unwrap_or_default();

    tracing::error_span!(
        "request",
        id = req_id,
        method = %req.method(),
        path = req.uri().path()
    )
}

fn log_response(res: &Response<Body>, latency: Duration, _s: &Span) {
    let status = res.status();

    if status.is_client_error() || status.is_server_error() {
        tracing::error!("END in: {latency:?} - STATUS: {}", status.as_u16())
    } else {
        info!("END in: {latency:?} - STATUS: {}", status.as_u16())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
