use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::{notifier, rate_client, store::StoreError};

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] super::types::DataParsingError),
    #[error("form extraction error: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("no route for '{0}'")]
    RouteNotFound(String),

    #[error("rate client error: {0}")]
    RateClient(#[from] rate_client::Error),
    #[error("subscriber store error: {0}")]
    Store(#[from] StoreError),
    #[error("notifier error: {0}")]
    Notifier(#[from] notifier::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::DataParsing(data_er) => {
                (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string()))
            }
            Error::FormRejection(rejection) => {
                (rejection.status(), InvalidInput(rejection.body_text()))
            }
            Error::RouteNotFound(path) => (StatusCode::NOT_FOUND, RouteNotFound(path.clone())),
            Error::Store(conflict @ StoreError::Conflict(_)) => {
                (StatusCode::CONFLICT, AlreadySubscribed(conflict.to_string()))
            }
            Error::RateClient(rate_er) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RateUnavailable(rate_er.to_string()),
            ),
            Error::Store(_) | Error::Notifier(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client gets to see, as `{"error": "<display>"}`.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(String),
    #[display("{_0}")]
    AlreadySubscribed(String),
    #[display("{_0}")]
    RateUnavailable(String),
    #[display("No route for '{_0}'.")]
    RouteNotFound(String),
    #[display("Service Error!")]
    ServiceError,
}
