//! HTTP server setup with Axum

use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use super::rest::{items, lists};
use super::{sse, AppState};

/// Create the Axum router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check & service info
        .route("/health", get(health_check))
        .route("/api", get(api_info))
        // Event stream
        .route("/events", get(sse::events_handler))
        // List metadata
        .route("/lists", get(lists::get_lists))
        .route("/lists/:id", get(lists::get_list).put(lists::rename_list))
        // Items
        .route(
            "/items",
            get(items::get_items)
                .post(items::create_item)
                .delete(items::clear_items),
        )
        .route(
            "/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/items/:id/toggle", patch(items::toggle_item))
        .route(
            "/items/:id/reorder/:position",
            patch(items::reorder_item),
        )
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// GET /api - service info payload
async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Shared Shopping List API",
        "version": crate::VERSION,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Broadcaster;
    use crate::store::Store;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    async fn test_app() -> Router {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.init().await.unwrap();
        store.default_list_id().await.unwrap();
        create_router(AppState::new(store, Broadcaster::new()))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_api_info() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_unknown_item_is_404() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/items/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }
}
