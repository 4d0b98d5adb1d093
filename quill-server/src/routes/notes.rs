use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use quill_core::{NewNote, Note, NoteChanges, NoteFilter, PageRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::routes::{PageResponse, page_response, rfc3339};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct NotePayload {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteResponse {
    fn new(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: rfc3339(note.created_at),
            updated_at: rfc3339(note.updated_at),
        }
    }
}

/// GET /api/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<NoteResponse>>> {
    let page = PageRequest::new(query.page.unwrap_or(1))?;
    let filter = NoteFilter {
        search: query.search,
    };
    let notes = state.notes.list(user, &filter, page).await?;
    Ok(Json(page_response(notes, NoteResponse::new)))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<NotePayload>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let note = state
        .notes
        .create(
            user,
            NewNote {
                title: body.title,
                content: body.content,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(NoteResponse::new(note))))
}

/// GET /api/notes/{id}
pub async fn get_note(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state.notes.get(user, id).await?;
    Ok(Json(NoteResponse::new(note)))
}

/// PUT /api/notes/{id}
pub async fn replace_note(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<NotePayload>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state
        .notes
        .update(
            user,
            id,
            NoteChanges {
                title: Some(body.title),
                content: Some(body.content),
            },
        )
        .await?;
    Ok(Json(NoteResponse::new(note)))
}

/// PATCH /api/notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<NotePatch>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state
        .notes
        .update(
            user,
            id,
            NoteChanges {
                title: body.title,
                content: body.content,
            },
        )
        .await?;
    Ok(Json(NoteResponse::new(note)))
}

/// DELETE /api/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.notes.delete(user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
