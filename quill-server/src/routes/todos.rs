use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use quill_core::{
    NewTodoItem, NewTodoList, PageRequest, TodoItem, TodoItemChanges, TodoList, TodoListChanges,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::routes::{PageResponse, page_response, rfc3339};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
}

#[derive(Deserialize)]
pub struct TodoListPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct TodoListPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct TodoItemPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Deserialize)]
pub struct TodoItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Serialize)]
pub struct TodoItemResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TodoItemResponse {
    fn new(item: TodoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            is_completed: item.is_completed,
            completed_at: item.completed_at.map(rfc3339),
            created_at: rfc3339(item.created_at),
            updated_at: rfc3339(item.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct TodoListResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub items: Vec<TodoItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl TodoListResponse {
    fn new(list: TodoList) -> Self {
        Self {
            id: list.id,
            title: list.title,
            description: list.description,
            items: list.items.into_iter().map(TodoItemResponse::new).collect(),
            created_at: rfc3339(list.created_at),
            updated_at: rfc3339(list.updated_at),
        }
    }
}

/// GET /api/todos
pub async fn list_todo_lists(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<TodoListResponse>>> {
    let page = PageRequest::new(query.page.unwrap_or(1))?;
    let lists = state.todos.list_lists(user, page).await?;
    Ok(Json(page_response(lists, TodoListResponse::new)))
}

/// POST /api/todos
pub async fn create_todo_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<TodoListPayload>,
) -> ApiResult<(StatusCode, Json<TodoListResponse>)> {
    let list = state
        .todos
        .create_list(
            user,
            NewTodoList {
                title: body.title,
                description: body.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TodoListResponse::new(list))))
}

/// GET /api/todos/{id}
pub async fn get_todo_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TodoListResponse>> {
    let list = state.todos.get_list(user, id).await?;
    Ok(Json(TodoListResponse::new(list)))
}

/// PUT /api/todos/{id}
pub async fn replace_todo_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<TodoListPayload>,
) -> ApiResult<Json<TodoListResponse>> {
    let list = state
        .todos
        .update_list(
            user,
            id,
            TodoListChanges {
                title: Some(body.title),
                description: Some(body.description),
            },
        )
        .await?;
    Ok(Json(TodoListResponse::new(list)))
}

/// PATCH /api/todos/{id}
pub async fn update_todo_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<TodoListPatch>,
) -> ApiResult<Json<TodoListResponse>> {
    let list = state
        .todos
        .update_list(
            user,
            id,
            TodoListChanges {
                title: body.title,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(TodoListResponse::new(list)))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.todos.delete_list(user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/todos/{id}/items
pub async fn list_todo_items(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<TodoItemResponse>>> {
    let page = PageRequest::new(query.page.unwrap_or(1))?;
    let items = state.todos.list_items(user, id, page).await?;
    Ok(Json(page_response(items, TodoItemResponse::new)))
}

/// POST /api/todos/{id}/items
pub async fn create_todo_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<TodoItemPayload>,
) -> ApiResult<(StatusCode, Json<TodoItemResponse>)> {
    let item = state
        .todos
        .create_item(
            user,
            id,
            NewTodoItem {
                title: body.title,
                description: body.description,
            },
        )
        .await?;
    // New items start out not completed; a payload asking for completion
    // goes through the same transition as any later update
    let item = if body.is_completed {
        state
            .todos
            .update_item(
                user,
                item.id,
                TodoItemChanges {
                    is_completed: Some(true),
                    ..TodoItemChanges::default()
                },
            )
            .await?
    } else {
        item
    };
    Ok((StatusCode::CREATED, Json(TodoItemResponse::new(item))))
}

/// GET /api/todos/items/{id}
pub async fn get_todo_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TodoItemResponse>> {
    let item = state.todos.get_item(user, id).await?;
    Ok(Json(TodoItemResponse::new(item)))
}

/// PUT /api/todos/items/{id}
pub async fn replace_todo_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<TodoItemPayload>,
) -> ApiResult<Json<TodoItemResponse>> {
    let item = state
        .todos
        .update_item(
            user,
            id,
            TodoItemChanges {
                title: Some(body.title),
                description: Some(body.description),
                is_completed: Some(body.is_completed),
            },
        )
        .await?;
    Ok(Json(TodoItemResponse::new(item)))
}

/// PATCH /api/todos/items/{id}
pub async fn update_todo_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<TodoItemPatch>,
) -> ApiResult<Json<TodoItemResponse>> {
    let item = state
        .todos
        .update_item(
            user,
            id,
            TodoItemChanges {
                title: body.title,
                description: body.description,
                is_completed: body.is_completed,
            },
        )
        .await?;
    Ok(Json(TodoItemResponse::new(item)))
}

/// DELETE /api/todos/items/{id}
pub async fn delete_todo_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.todos.delete_item(user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
