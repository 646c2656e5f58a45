//! List metadata endpoints

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use super::{client_token, ApiResult, ClientParams};
use crate::api::AppState;
use crate::types::{ChangeEvent, EventEnvelope, ListRename};

/// GET /lists - all lists, oldest first
pub async fn get_lists(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let lists = state.store.lists().await?;
    Ok(Json(lists))
}

/// GET /lists/:id - single list metadata
pub async fn get_list(
    State(state): State<AppState>,
    Path(list_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let list = state.store.get_list(list_id).await?;
    Ok(Json(list))
}

/// PUT /lists/:id - rename a list
pub async fn rename_list(
    State(state): State<AppState>,
    Path(list_id): Path<i64>,
    headers: HeaderMap,
    Query(params): Query<ClientParams>,
    Json(body): Json<ListRename>,
) -> ApiResult<impl IntoResponse> {
    let list = state.store.rename_list(list_id, &body.name).await?;

    state.events.publish(EventEnvelope::new(
        ChangeEvent::ListRenamed {
            list_id,
            name: list.name.clone(),
        },
        client_token(&headers, &params),
    ));

    Ok(Json(list))
}
