use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use shelfwatch_common::error::ShelfError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Shelf(#[from] ShelfError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Shelf(ShelfError::UnknownProductType(_)) => StatusCode::BAD_REQUEST,
            ApiError::Shelf(ShelfError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Shelf(ShelfError::NotFound(_))
            | ApiError::Store(StoreError::UnknownProduct(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "storage failure");
            "internal storage error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
