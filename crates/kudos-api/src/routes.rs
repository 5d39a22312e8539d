use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::error;

use kudos_types::api::ListKudosQuery;

use crate::service::{self, CreateKudosRequest, HandlerReply};
use crate::store::KudosStore;

pub type SharedStore = Arc<dyn KudosStore>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

/// The full HTTP surface with the CORS contract applied. Request tracing is
/// layered on by the binary (and left off in tests).
pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/kudos", post(create_kudos))
        .route("/kudos", get(list_kudos))
        .layer(middleware::from_fn(crate::middleware::cors))
        .with_state(AppState { store })
}

async fn health() -> impl IntoResponse {
    Json(json!({ "message": "Hello API" }))
}

async fn create_kudos(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let sender_id_header = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // An unparseable body validates like any other malformed payload, so
    // the 400 shape stays consistent with the rest of the contract.
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    // Run the blocking store call off the async runtime
    let store = state.store.clone();
    let reply = tokio::task::spawn_blocking(move || {
        service::handle_create_kudos(
            store.as_ref(),
            CreateKudosRequest {
                sender_id_header,
                body,
            },
        )
    })
    .await;

    unwrap_join(reply, "Failed to create kudos.")
}

async fn list_kudos(
    State(state): State<AppState>,
    Query(query): Query<ListKudosQuery>,
) -> Response {
    let store = state.store.clone();
    let reply =
        tokio::task::spawn_blocking(move || service::handle_list_kudos(store.as_ref(), query))
            .await;

    unwrap_join(reply, "Failed to fetch kudos.")
}

fn unwrap_join(
    result: Result<HandlerReply, tokio::task::JoinError>,
    message: &str,
) -> Response {
    match result {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": message })),
            )
                .into_response()
        }
    }
}
