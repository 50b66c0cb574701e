use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::document::LayoutError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Base64 data exceeds the maximum allowed length")]
    Base64DataTooLarge,

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    #[error("Decoded image exceeds the maximum allowed size of {limit} bytes")]
    FileSizeTooLarge { limit: u64 },

    #[error("Page numbers start at 1")]
    InvalidPageNumber,

    #[error("Document contains no pages")]
    NoPages,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("Layout analysis failed")]
    Layout {
        #[from]
        source: LayoutError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Layout { source } if source.is_validation() => StatusCode::BAD_REQUEST,
            AppError::Layout {
                source: LayoutError::ImageLoadError { .. },
            } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Layout { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_message, details) = match &self {
            AppError::Validation { source } => ("Bad Request", source.to_string()),
            AppError::Layout { source } if source.is_validation() => {
                ("Bad Request", source.reason())
            }
            AppError::Layout {
                source: source @ LayoutError::ImageLoadError { .. },
            } => ("Image Decode Error", source.reason()),
            AppError::Layout { source } => ("Layout Analysis Error", source.reason()),
            AppError::Internal(message) => ("Internal Server Error", message.clone()),
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", error_message, details);
        }

        let error_response = ErrorResponse::new(error_message).with_details(details);
        (status, Json(error_response)).into_response()
    }
}
