//! Notes: owner-scoped CRUD contract

use async_trait::async_trait;

use crate::account::UserId;
use crate::error::CoreResult;
use crate::page::{Page, PageRequest};

#[derive(Clone, Debug)]
pub struct Note {
    pub id: i64,
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

/// Partial-update payload; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct NoteFilter {
    /// Case-insensitive substring match against title or content.
    pub search: Option<String>,
}

/// Note storage. Every call is scoped by the owning user; a note that
/// exists under someone else's identity behaves exactly like one that
/// does not exist.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Create a note owned by `owner`. The owner always comes from the
    /// authenticated identity, never from the payload.
    async fn create(&self, owner: UserId, new: NewNote) -> CoreResult<Note>;

    /// Fetch one note, or `NotFound` if missing or foreign-owned.
    async fn get(&self, owner: UserId, id: i64) -> CoreResult<Note>;

    /// List the owner's notes, most recently updated first (ties broken by
    /// id descending). Filtering happens before pagination.
    async fn list(
        &self,
        owner: UserId,
        filter: &NoteFilter,
        page: PageRequest,
    ) -> CoreResult<Page<Note>>;

    /// Apply changes and bump `updated_at` to a strictly later value.
    async fn update(&self, owner: UserId, id: i64, changes: NoteChanges) -> CoreResult<Note>;

    /// Hard delete. `NotFound` if missing or foreign-owned.
    async fn delete(&self, owner: UserId, id: i64) -> CoreResult<()>;
}
