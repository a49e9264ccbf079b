//! REST API module.
//!
//! Card CRUD handlers plus photo upload and download.

mod cards;
mod photos;

pub use cards::*;
pub use photos::*;

use axum::extract::FromRequest;

use crate::errors::AppError;

/// JSON body extractor whose rejections render as [`AppError::InvalidBody`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct CardJson<T>(pub T);

/// Handler result; errors render through [`crate::errors::AppError`]'s `IntoResponse`.
pub type ApiResult<T> = Result<T, crate::errors::AppError>;
