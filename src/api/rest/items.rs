//! Item CRUD, toggle, reorder and clear endpoints
//!
//! All position bookkeeping is delegated to the ordering engine in the
//! store; handlers validate input, invoke one store operation and
//! publish the resulting change event. Broadcast delivery failures
//! never affect the HTTP response.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::{client_token, ApiFailure, ApiResult, ClientParams};
use crate::api::AppState;
use crate::types::{ChangeEvent, EventEnvelope, ItemDraft};

/// Query parameters for list-scoped item endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsParams {
    /// Defaults to the first list when absent.
    pub list_id: Option<i64>,
    pub client_id: Option<String>,
}

impl ItemsParams {
    fn client(&self) -> ClientParams {
        ClientParams {
            client_id: self.client_id.clone(),
        }
    }
}

async fn resolve_list_id(state: &AppState, params: &ItemsParams) -> ApiResult<i64> {
    match params.list_id {
        Some(id) => Ok(id),
        None => Ok(state.store.default_list_id().await?),
    }
}

fn validate(draft: &ItemDraft) -> ApiResult<()> {
    if draft.quantity < 1 {
        return Err(ApiFailure::BadRequest(format!(
            "quantity must be a positive integer, got {}",
            draft.quantity
        )));
    }
    if draft.position < 0 {
        return Err(ApiFailure::BadRequest(format!(
            "position must be 0 (append) or a 1-based target, got {}",
            draft.position
        )));
    }
    Ok(())
}

/// GET /items?list_id= - items of a list, ordered by position then id
pub async fn get_items(
    State(state): State<AppState>,
    Query(params): Query<ItemsParams>,
) -> ApiResult<impl IntoResponse> {
    let list_id = resolve_list_id(&state, &params).await?;
    let items = state.store.items(list_id).await?;
    Ok(Json(items))
}

/// GET /items/:id - single item
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let item = state.store.get_item(item_id).await?;
    Ok(Json(item))
}

/// POST /items?list_id= - create an item; position 0 or absent appends
pub async fn create_item(
    State(state): State<AppState>,
    Query(params): Query<ItemsParams>,
    headers: HeaderMap,
    Json(draft): Json<ItemDraft>,
) -> ApiResult<impl IntoResponse> {
    validate(&draft)?;
    let list_id = resolve_list_id(&state, &params).await?;

    let item = if draft.position == 0 {
        state.store.append_item(list_id, &draft).await?
    } else {
        state
            .store
            .insert_item_at(list_id, &draft, draft.position)
            .await?
    };

    state.events.publish(EventEnvelope::new(
        ChangeEvent::Created { item: item.clone() },
        client_token(&headers, &params.client()),
    ));

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /items/:id - update fields, optionally repositioning
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Query(params): Query<ClientParams>,
    headers: HeaderMap,
    Json(draft): Json<ItemDraft>,
) -> ApiResult<impl IntoResponse> {
    validate(&draft)?;

    // Position 0 or absent leaves the current ordering untouched.
    let position = (draft.position >= 1).then_some(draft.position);
    let item = state
        .store
        .update_item(item_id, &draft.name, draft.quantity, draft.completed, position)
        .await?;

    state.events.publish(EventEnvelope::new(
        ChangeEvent::Updated { item: item.clone() },
        client_token(&headers, &params),
    ));

    Ok(Json(item))
}

/// DELETE /items/:id - delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Query(params): Query<ClientParams>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let item = state.store.delete_item(item_id).await?;

    state.events.publish(EventEnvelope::new(
        ChangeEvent::Deleted {
            list_id: item.list_id,
            item_id: item.id,
        },
        client_token(&headers, &params),
    ));

    Ok(Json(json!({
        "message": "Item deleted successfully",
        "id": item.id,
    })))
}

/// PATCH /items/:id/toggle - flip the completed flag
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Query(params): Query<ClientParams>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let item = state.store.toggle_item(item_id).await?;

    state.events.publish(EventEnvelope::new(
        ChangeEvent::Toggled {
            list_id: item.list_id,
            item_id: item.id,
            completed: item.completed,
        },
        client_token(&headers, &params),
    ));

    Ok(Json(json!({
        "id": item.id,
        "completed": item.completed,
    })))
}

/// PATCH /items/:id/reorder/:position - move an item to a new position
pub async fn reorder_item(
    State(state): State<AppState>,
    Path((item_id, position)): Path<(i64, i64)>,
    Query(params): Query<ClientParams>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let moved = state.store.move_item(item_id, position).await?;

    if moved.from_position != moved.item.position {
        state.events.publish(EventEnvelope::new(
            ChangeEvent::Reordered {
                list_id: moved.item.list_id,
                item_id: moved.item.id,
                from_position: moved.from_position,
                to_position: moved.item.position,
            },
            client_token(&headers, &params),
        ));
    }

    Ok(Json(moved.item))
}

/// DELETE /items?list_id= - clear a list
pub async fn clear_items(
    State(state): State<AppState>,
    Query(params): Query<ItemsParams>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let list_id = resolve_list_id(&state, &params).await?;
    let removed = state.store.clear_list(list_id).await?;

    state.events.publish(EventEnvelope::new(
        ChangeEvent::Cleared { list_id },
        client_token(&headers, &params.client()),
    ));

    Ok(Json(json!({
        "message": "All items cleared successfully",
        "removed": removed,
    })))
}
