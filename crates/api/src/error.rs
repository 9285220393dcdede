//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be decoded.
    InvalidRequest(String),
    /// Error raised by the order service.
    Order(OrderError),
}

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Order(err) => order_error_status(err),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Order(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            ApiError::InvalidRequest(msg) => {
                metrics::counter!("order_errors_total", "operation" => "decode", "code" => code)
                    .increment(1);
                msg
            }
            ApiError::Order(err) if status.is_server_error() => {
                tracing::error!(error = %err, "internal server error");
                "internal error".to_string()
            }
            ApiError::Order(err) => err.to_string(),
        };

        (status, axum::Json(ErrorBody { code, message })).into_response()
    }
}

fn order_error_status(err: &OrderError) -> StatusCode {
    match err {
        OrderError::InvalidQuantity { .. } | OrderError::TotalOverflow => StatusCode::BAD_REQUEST,
        OrderError::InvalidStatusTransition { .. } | OrderError::ItemsLocked { .. } => {
            StatusCode::CONFLICT
        }
        OrderError::Timeout { .. } | OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        OrderError::InvalidId(_)
        | OrderError::OrderNotProvided
        | OrderError::OrderNotFound(_)
        | OrderError::OrderNotProcessed(_)
        | OrderError::UpdateNotSpecified
        | OrderError::ItemNotFound(_)
        | OrderError::OrderNotPaid(_)
        | OrderError::OrderAlreadyDelivered(_) => StatusCode::NOT_FOUND,
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
