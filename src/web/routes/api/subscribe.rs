use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap},
    Form, Json,
};
use serde_json::{json, Value};

use crate::{
    web::{types::SubscribeForm, WebResult},
    AppState,
};

/// Takes a form with a single `email` field and adds the address to the subscribers.
/// Anything else in the form is rejected.
#[tracing::instrument(name = "Subscribing email", skip_all, fields(email = tracing::field::Empty))]
pub async fn subscribe(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> WebResult<Json<Value>> {
    let fields = match form {
        Ok(Form(fields)) => fields,
        // A bare POST carries no fields at all, report the missing email instead of the media type.
        Err(FormRejection::InvalidFormContentType(_)) if has_no_body(&headers) => Vec::new(),
        Err(rejection) => return Err(rejection.into()),
    };

    let form = SubscribeForm::parse(fields)?;
    tracing::Span::current().record("email", tracing::field::display(&form.email));

    let record = app_state.store.subscribe(&form.email).await?;

    Ok(Json(json!({
        "message": format!("E-mail '{}' added.", record.email)
    })))
}

/// No content type and nothing announced in the body.
fn has_no_body(headers: &HeaderMap) -> bool {
    if headers.contains_key(header::CONTENT_TYPE) || headers.contains_key(header::TRANSFER_ENCODING)
    {
        return false;
    }

    headers
        .get(header::CONTENT_LENGTH)
        .map(|len| len.as_bytes() == b"0")
        .unwrap_or(true)
}
