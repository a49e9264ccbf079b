//! Photo upload and download endpoints.

use std::path::Path as FsPath;

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
};

use super::ApiResult;
use crate::errors::AppError;
use crate::AppState;

/// Name of the multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// POST /cards/photo - Store an uploaded PNG or JPEG under its original file name.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<&'static str> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::MissingFile);
        }

        let content_type = content_type.unwrap_or_default();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::UnsupportedMediaType(content_type));
        }

        let file_name = file_name
            .as_deref()
            .and_then(base_name)
            .ok_or_else(|| AppError::BadRequest("Invalid file name".to_string()))?;

        tokio::fs::create_dir_all(&state.config.images_dir).await?;
        let target = state.config.images_dir.join(file_name);
        tokio::fs::write(&target, &bytes).await?;

        tracing::info!(bytes = bytes.len(), "Uploaded photo {:?}", target);
        return Ok("File uploaded successfully");
    }

    Err(AppError::MissingFile)
}

/// GET /cards/photos/{filename} - Serve a stored photo.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let not_found = || AppError::NotFound(format!("Photo {} not found", filename));

    if base_name(&filename) != Some(filename.as_str()) {
        return Err(not_found());
    }
    let content_type = content_type_for(&filename).ok_or_else(not_found)?;

    let bytes = match tokio::fs::read(state.config.images_dir.join(&filename)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(bytes = bytes.len(), "GET /cards/photos/{}", filename);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// Final path component of a client-supplied name, if it has a usable one.
fn base_name(name: &str) -> Option<&str> {
    FsPath::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
}

fn content_type_for(filename: &str) -> Option<&'static str> {
    let extension = FsPath::new(filename).extension()?.to_str()?;
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
