use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{notifier, web::WebResult, AppState};

/// Mails the current rate to every subscriber.
/// Responds with every address a send was attempted for, delivered or not.
#[tracing::instrument(name = "Sending rate emails", skip(app_state))]
pub async fn send_emails(State(app_state): State<AppState>) -> WebResult<Json<Value>> {
    let quote = app_state.rate_client.fetch_quote().await?;
    info!(rate = quote.price, "got the rate");

    let report = notifier::send_rate(
        &app_state.store,
        &app_state.templ_mgr,
        app_state.email_client.as_ref(),
        &quote,
    )
    .await?;

    Ok(Json(json!({
        "message": "E-mails sent",
        "emails": report.attempted,
    })))
}
