//! Error handling module for the Tokidex backend.
//!
//! Provides a single error type with mapping to HTTP status codes.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_CATEGORY: &str = "INVALID_CATEGORY";
    pub const CONFLICT: &str = "CONFLICT";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INVALID_BODY: &str = "INVALID_BODY";
    pub const MISSING_FILE: &str = "MISSING_FILE";
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "UNSUPPORTED_MEDIA_TYPE";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Message returned when an upload carries no file.
pub const MISSING_FILE_MESSAGE: &str = "File is not found";

/// Message returned when an upload is neither PNG nor JPEG.
pub const INVALID_FILE_TYPE_MESSAGE: &str =
    "Invalid file type. Only PNG and JPEG files are allowed";

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// No card or photo with the requested key
    NotFound(String),
    /// Category string is not one of the known element types
    InvalidCategory(String),
    /// Update would give a card an id another card already has
    Conflict(String),
    /// Malformed request
    BadRequest(String),
    /// Card body that is not JSON or does not fit the card shape
    InvalidBody(String),
    /// Upload without a file, or with an empty one
    MissingFile,
    /// Upload with a content type other than PNG or JPEG
    UnsupportedMediaType(String),
    /// Reading or writing the backing file failed
    Storage(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::NOT_FOUND,
            AppError::UnsupportedMediaType(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::InvalidCategory(_) => codes::INVALID_CATEGORY,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::InvalidBody(_) => codes::INVALID_BODY,
            AppError::MissingFile => codes::MISSING_FILE,
            AppError::UnsupportedMediaType(_) => codes::UNSUPPORTED_MEDIA_TYPE,
            AppError::Storage(_) => codes::STORAGE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidCategory(raw) => format!("Invalid element type: {}", raw),
            AppError::Conflict(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::InvalidBody(msg) => msg.clone(),
            AppError::MissingFile => MISSING_FILE_MESSAGE.to_string(),
            AppError::UnsupportedMediaType(_) => INVALID_FILE_TYPE_MESSAGE.to_string(),
            AppError::Storage(msg) => msg.clone(),
        }
    }

    /// Upload failures carry their message to the client; everything else is status only.
    fn exposes_message(&self) -> bool {
        matches!(
            self,
            AppError::MissingFile | AppError::UnsupportedMediaType(_) | AppError::BadRequest(_)
        )
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {:?}", err);
        AppError::Storage(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Storage JSON error: {:?}", err);
        AppError::Storage(format!("JSON error: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(status = status.as_u16(), "request failed: {}", self);

        if self.exposes_message() {
            (status, self.message()).into_response()
        } else {
            status.into_response()
        }
    }
}
