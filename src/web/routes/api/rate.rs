use axum::{extract::State, Json};
use tracing::info;

use crate::{web::WebResult, AppState};

#[tracing::instrument(name = "Getting the current rate", skip(app_state))]
pub async fn rate(State(app_state): State<AppState>) -> WebResult<Json<f64>> {
    let rate = app_state.rate_client.fetch_rate().await?;
    info!(rate, "got the rate");

    Ok(Json(rate))
}
