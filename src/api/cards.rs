//! Card API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{ApiResult, CardJson};
use crate::errors::AppError;
use crate::models::{Card, CreateCardRequest, UpdateCardRequest};
use crate::AppState;

/// GET /cards - List all cards.
pub async fn list_cards(State(state): State<AppState>) -> ApiResult<Json<Vec<Card>>> {
    let cards = state.store.list_cards().await?;
    tracing::info!(count = cards.len(), "GET /cards");
    Ok(Json(cards))
}

/// GET /cards/{id} - Get a single card.
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Card>> {
    tracing::info!(id, "GET /cards/{{id}}");
    Ok(Json(state.store.get_card(id).await?))
}

/// POST /cards - Create a new card.
pub async fn create_card(
    State(state): State<AppState>,
    CardJson(request): CardJson<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    // Validate before reserving an id so rejected requests leave no gaps
    let category = request.category()?;
    let id = state.store.allocate_id();

    let card = state.store.add_card(request.into_card(id, category)).await?;
    tracing::info!(id, category = %card.category, "POST /cards");

    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT /cards/{id} - Patch an existing card.
pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    CardJson(request): CardJson<UpdateCardRequest>,
) -> ApiResult<Json<Card>> {
    tracing::info!(id, "PUT /cards/{{id}}");
    let patch = request.into_patch()?;
    Ok(Json(state.store.update_card(id, &patch).await?))
}

/// DELETE /cards/{id} - Delete a card.
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    tracing::info!(id, "DELETE /cards/{{id}}");

    // The store treats absent ids as a no-op; the API reports them
    if !state.store.delete_card(id).await? {
        return Err(AppError::NotFound(format!("Card {} not found", id)));
    }

    let total = state.store.total().await;
    tracing::debug!(total, "Card removed");
    Ok(StatusCode::NO_CONTENT)
}
