use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use quill_core::Page;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;

mod auth;
mod health;
mod notes;
mod todos;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/delete-account", post(auth::delete_account))
        .route(
            "/api/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(notes::get_note)
                .put(notes::replace_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/api/todos",
            get(todos::list_todo_lists).post(todos::create_todo_list),
        )
        .route(
            "/api/todos/{id}",
            get(todos::get_todo_list)
                .put(todos::replace_todo_list)
                .patch(todos::update_todo_list)
                .delete(todos::delete_todo_list),
        )
        .route(
            "/api/todos/{id}/items",
            get(todos::list_todo_items).post(todos::create_todo_item),
        )
        .route(
            "/api/todos/items/{id}",
            get(todos::get_todo_item)
                .put(todos::replace_todo_item)
                .patch(todos::update_todo_item)
                .delete(todos::delete_todo_item),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unix microseconds to the RFC 3339 strings the API speaks
pub(crate) fn rfc3339(micros: i64) -> String {
    chrono::DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Standard page envelope: total count plus next/previous page numbers
#[derive(Serialize)]
pub(crate) struct PageResponse<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

pub(crate) fn page_response<T, U>(page: Page<T>, map: impl Fn(T) -> U) -> PageResponse<U> {
    let next = page.next();
    let previous = page.previous();
    PageResponse {
        count: page.total,
        next,
        previous,
        results: page.items.into_iter().map(map).collect(),
    }
}
