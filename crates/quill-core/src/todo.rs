//! Todo lists and items: owner-scoped CRUD contract

use async_trait::async_trait;

use crate::account::UserId;
use crate::error::CoreResult;
use crate::page::{Page, PageRequest};

#[derive(Clone, Debug)]
pub struct TodoList {
    pub id: i64,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// The list's items, newest-updated first. Loaded with the list.
    pub items: Vec<TodoItem>,
}

#[derive(Clone, Debug)]
pub struct TodoItem {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// Set when `is_completed` flips to true, cleared when it flips back.
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug)]
pub struct NewTodoList {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct TodoListChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewTodoItem {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct TodoItemChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

/// Todo storage. Items are reached through their list for create/list and
/// directly by id otherwise; both paths are scoped to the list's owner, so
/// a foreign list or item behaves exactly like a missing one.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create_list(&self, owner: UserId, new: NewTodoList) -> CoreResult<TodoList>;

    async fn get_list(&self, owner: UserId, id: i64) -> CoreResult<TodoList>;

    /// List the owner's todo lists, most recently updated first.
    async fn list_lists(&self, owner: UserId, page: PageRequest) -> CoreResult<Page<TodoList>>;

    async fn update_list(
        &self,
        owner: UserId,
        id: i64,
        changes: TodoListChanges,
    ) -> CoreResult<TodoList>;

    /// Hard delete; the list's items go with it.
    async fn delete_list(&self, owner: UserId, id: i64) -> CoreResult<()>;

    /// Create an item in one of the owner's lists. A missing or foreign
    /// list is `NotFound`.
    async fn create_item(
        &self,
        owner: UserId,
        list_id: i64,
        new: NewTodoItem,
    ) -> CoreResult<TodoItem>;

    /// Page through one list's items, most recently updated first.
    async fn list_items(
        &self,
        owner: UserId,
        list_id: i64,
        page: PageRequest,
    ) -> CoreResult<Page<TodoItem>>;

    async fn get_item(&self, owner: UserId, item_id: i64) -> CoreResult<TodoItem>;

    /// Apply changes, maintaining `completed_at` across `is_completed`
    /// transitions, and bump `updated_at` to a strictly later value.
    async fn update_item(
        &self,
        owner: UserId,
        item_id: i64,
        changes: TodoItemChanges,
    ) -> CoreResult<TodoItem>;

    async fn delete_item(&self, owner: UserId, item_id: i64) -> CoreResult<()>;
}
