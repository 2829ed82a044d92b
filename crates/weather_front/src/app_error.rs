use crate::{ErrorCategory, LookupError};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use log::debug;
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Failed to look up forecast for '{city}': {source}")]
    Lookup {
        city: String,
        #[source]
        source: LookupError,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        debug!("error handling request: {}", self);

        let (status, category, error_message) = match &self {
            AppError::Lookup { city, source } => {
                let category = source.category();
                let status = match category {
                    ErrorCategory::InvalidCity => StatusCode::NOT_FOUND,
                    ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    ErrorCategory::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCategory::HttpError
                    | ErrorCategory::RequestError
                    | ErrorCategory::DataError => StatusCode::BAD_GATEWAY,
                    ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = category.message(city, source.details().as_deref());
                (status, category, message)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "category": category.as_str(),
        }));
        (status, body).into_response()
    }
}
