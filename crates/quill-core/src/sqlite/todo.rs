//! SQLite todo store

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::{Database, now_micros};
use crate::account::UserId;
use crate::error::{CoreError, CoreResult};
use crate::fields::{check_body, normalize_title};
use crate::page::{PAGE_SIZE, Page, PageRequest, last_page};
use crate::todo::{
    NewTodoItem, NewTodoList, TodoItem, TodoItemChanges, TodoList, TodoListChanges, TodoStore,
};

const LIST_COLS: &str = "id, user_id, title, description, created_at, updated_at";
const ITEM_COLS: &str =
    "id, list_id, title, description, is_completed, completed_at, created_at, updated_at";

/// SQLite-backed todo repository. List reads embed the list's items.
pub struct SqliteTodoStore {
    db: Database,
}

impl SqliteTodoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn list_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TodoList> {
    Ok(TodoList {
        id: row.get(0)?,
        owner: UserId::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        items: Vec::new(),
    })
}

fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        list_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_completed: row.get(4)?,
        completed_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn ensure_list_owned(conn: &Connection, owner: UserId, list_id: i64) -> CoreResult<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM todo_lists WHERE id = ? AND user_id = ?",
            (list_id, owner.get()),
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(CoreError::NotFound);
    }
    Ok(())
}

fn items_for_list(conn: &Connection, list_id: i64) -> CoreResult<Vec<TodoItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLS} FROM todo_items WHERE list_id = ? ORDER BY updated_at DESC, id DESC"
    ))?;
    let items = stmt
        .query_map([list_id], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn item_owned_by(conn: &Connection, owner: UserId, item_id: i64) -> CoreResult<TodoItem> {
    conn.query_row(
        r#"SELECT i.id, i.list_id, i.title, i.description, i.is_completed,
                  i.completed_at, i.created_at, i.updated_at
           FROM todo_items i
           JOIN todo_lists l ON l.id = i.list_id
           WHERE i.id = ? AND l.user_id = ?"#,
        (item_id, owner.get()),
        item_from_row,
    )
    .optional()?
    .ok_or(CoreError::NotFound)
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn create_list(&self, owner: UserId, new: NewTodoList) -> CoreResult<TodoList> {
        let title = normalize_title("title", &new.title)?;
        check_body("description", &new.description)?;
        let now = now_micros();

        let conn = self.db.lock();
        conn.execute(
            r#"INSERT INTO todo_lists (user_id, title, description, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
            (owner.get(), &title, &new.description, now, now),
        )?;
        Ok(TodoList {
            id: conn.last_insert_rowid(),
            owner,
            title,
            description: new.description,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        })
    }

    async fn get_list(&self, owner: UserId, id: i64) -> CoreResult<TodoList> {
        let conn = self.db.lock();
        let mut list = conn
            .query_row(
                &format!("SELECT {LIST_COLS} FROM todo_lists WHERE id = ? AND user_id = ?"),
                (id, owner.get()),
                list_from_row,
            )
            .optional()?
            .ok_or(CoreError::NotFound)?;
        list.items = items_for_list(&conn, list.id)?;
        Ok(list)
    }

    async fn list_lists(&self, owner: UserId, page: PageRequest) -> CoreResult<Page<TodoList>> {
        let conn = self.db.lock();

        let total: u64 = conn.query_row(
            "SELECT COUNT(*) FROM todo_lists WHERE user_id = ?",
            [owner.get()],
            |row| row.get(0),
        )?;
        if page.number() > last_page(total) {
            return Err(CoreError::NotFound);
        }

        let mut stmt = conn.prepare(&format!(
            r#"SELECT {LIST_COLS} FROM todo_lists
               WHERE user_id = ?
               ORDER BY updated_at DESC, id DESC
               LIMIT ? OFFSET ?"#
        ))?;
        let mut lists = stmt
            .query_map(
                (owner.get(), PAGE_SIZE as i64, page.offset() as i64),
                list_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        for list in &mut lists {
            list.items = items_for_list(&conn, list.id)?;
        }

        Ok(Page {
            items: lists,
            total,
            number: page.number(),
        })
    }

    async fn update_list(
        &self,
        owner: UserId,
        id: i64,
        changes: TodoListChanges,
    ) -> CoreResult<TodoList> {
        let conn = self.db.lock();
        let existing = conn
            .query_row(
                &format!("SELECT {LIST_COLS} FROM todo_lists WHERE id = ? AND user_id = ?"),
                (id, owner.get()),
                list_from_row,
            )
            .optional()?
            .ok_or(CoreError::NotFound)?;

        let title = match changes.title {
            Some(raw) => normalize_title("title", &raw)?,
            None => existing.title,
        };
        let description = match changes.description {
            Some(value) => {
                check_body("description", &value)?;
                value
            }
            None => existing.description,
        };
        let updated_at = now_micros().max(existing.updated_at + 1);

        conn.execute(
            "UPDATE todo_lists SET title = ?, description = ?, updated_at = ? WHERE id = ?",
            (&title, &description, updated_at, id),
        )?;
        Ok(TodoList {
            id,
            owner,
            title,
            description,
            created_at: existing.created_at,
            updated_at,
            items: items_for_list(&conn, id)?,
        })
    }

    async fn delete_list(&self, owner: UserId, id: i64) -> CoreResult<()> {
        let conn = self.db.lock();
        // Items go with the list via the cascade
        let deleted = conn.execute(
            "DELETE FROM todo_lists WHERE id = ? AND user_id = ?",
            (id, owner.get()),
        )?;
        if deleted == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    async fn create_item(
        &self,
        owner: UserId,
        list_id: i64,
        new: NewTodoItem,
    ) -> CoreResult<TodoItem> {
        let title = normalize_title("title", &new.title)?;
        check_body("description", &new.description)?;
        let now = now_micros();

        let conn = self.db.lock();
        ensure_list_owned(&conn, owner, list_id)?;
        conn.execute(
            r#"INSERT INTO todo_items
               (list_id, title, description, is_completed, completed_at, created_at, updated_at)
               VALUES (?, ?, ?, 0, NULL, ?, ?)"#,
            (list_id, &title, &new.description, now, now),
        )?;
        Ok(TodoItem {
            id: conn.last_insert_rowid(),
            list_id,
            title,
            description: new.description,
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_items(
        &self,
        owner: UserId,
        list_id: i64,
        page: PageRequest,
    ) -> CoreResult<Page<TodoItem>> {
        let conn = self.db.lock();
        ensure_list_owned(&conn, owner, list_id)?;

        let total: u64 = conn.query_row(
            "SELECT COUNT(*) FROM todo_items WHERE list_id = ?",
            [list_id],
            |row| row.get(0),
        )?;
        if page.number() > last_page(total) {
            return Err(CoreError::NotFound);
        }

        let mut stmt = conn.prepare(&format!(
            r#"SELECT {ITEM_COLS} FROM todo_items
               WHERE list_id = ?
               ORDER BY updated_at DESC, id DESC
               LIMIT ? OFFSET ?"#
        ))?;
        let items = stmt
            .query_map(
                (list_id, PAGE_SIZE as i64, page.offset() as i64),
                item_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            number: page.number(),
        })
    }

    async fn get_item(&self, owner: UserId, item_id: i64) -> CoreResult<TodoItem> {
        let conn = self.db.lock();
        item_owned_by(&conn, owner, item_id)
    }

    async fn update_item(
        &self,
        owner: UserId,
        item_id: i64,
        changes: TodoItemChanges,
    ) -> CoreResult<TodoItem> {
        let conn = self.db.lock();
        let existing = item_owned_by(&conn, owner, item_id)?;

        let title = match changes.title {
            Some(raw) => normalize_title("title", &raw)?,
            None => existing.title,
        };
        let description = match changes.description {
            Some(value) => {
                check_body("description", &value)?;
                value
            }
            None => existing.description,
        };
        let now = now_micros();
        let is_completed = changes.is_completed.unwrap_or(existing.is_completed);
        // completed_at tracks the false->true edge and survives no-op updates
        let completed_at = match (existing.is_completed, is_completed) {
            (false, true) => Some(now),
            (true, false) => None,
            _ => existing.completed_at,
        };
        let updated_at = now.max(existing.updated_at + 1);

        conn.execute(
            r#"UPDATE todo_items
               SET title = ?, description = ?, is_completed = ?, completed_at = ?, updated_at = ?
               WHERE id = ?"#,
            (&title, &description, is_completed, completed_at, updated_at, item_id),
        )?;
        Ok(TodoItem {
            id: item_id,
            list_id: existing.list_id,
            title,
            description,
            is_completed,
            completed_at,
            created_at: existing.created_at,
            updated_at,
        })
    }

    async fn delete_item(&self, owner: UserId, item_id: i64) -> CoreResult<()> {
        let conn = self.db.lock();
        let deleted = conn.execute(
            r#"DELETE FROM todo_items
               WHERE id = ? AND list_id IN (SELECT id FROM todo_lists WHERE user_id = ?)"#,
            (item_id, owner.get()),
        )?;
        if deleted == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_user(db: &Database, email: &str) -> UserId {
        let conn = db.lock();
        conn.execute(
            r#"INSERT INTO users (email, password_hash, first_name, last_name, created_at)
               VALUES (?, 'x', '', '', 0)"#,
            [email],
        )
        .unwrap();
        UserId::new(conn.last_insert_rowid())
    }

    fn todo_list(title: &str) -> NewTodoList {
        NewTodoList {
            title: title.into(),
            description: String::new(),
        }
    }

    fn todo_item(title: &str) -> NewTodoItem {
        NewTodoItem {
            title: title.into(),
            description: String::new(),
        }
    }

    fn page(number: u64) -> PageRequest {
        PageRequest::new(number).unwrap()
    }

    fn complete(done: bool) -> TodoItemChanges {
        TodoItemChanges {
            is_completed: Some(done),
            ..TodoItemChanges::default()
        }
    }

    #[tokio::test]
    async fn lists_embed_their_items_newest_first() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(owner, todo_list("Chores")).await.unwrap();
        assert!(list.items.is_empty());

        let first = store
            .create_item(owner, list.id, todo_item("dishes"))
            .await
            .unwrap();
        let second = store
            .create_item(owner, list.id, todo_item("laundry"))
            .await
            .unwrap();

        let fetched = store.get_list(owner, list.id).await.unwrap();
        let ids: Vec<i64> = fetched.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        // Touching an item floats it to the front of the embed
        store
            .update_item(owner, first.id, complete(true))
            .await
            .unwrap();
        let fetched = store.get_list(owner, list.id).await.unwrap();
        let ids: Vec<i64> = fetched.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn lists_are_scoped_to_their_owner() {
        let db = Database::in_memory().unwrap();
        let alice = seed_user(&db, "alice@x.com");
        let bob = seed_user(&db, "bob@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(alice, todo_list("Private")).await.unwrap();

        let err = store.get_list(bob, list.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store
            .update_list(bob, list.id, TodoListChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store.delete_list(bob, list.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));

        let bobs = store.list_lists(bob, page(1)).await.unwrap();
        assert_eq!(bobs.total, 0);
    }

    #[tokio::test]
    async fn list_pagination_counts_and_markers() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        for i in 0..25 {
            store
                .create_list(owner, todo_list(&format!("list {i}")))
                .await
                .unwrap();
        }

        let first = store.list_lists(owner, page(1)).await.unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.next(), Some(2));

        let second = store.list_lists(owner, page(2)).await.unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.previous(), Some(1));

        let err = store.list_lists(owner, page(3)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
    }

    #[tokio::test]
    async fn update_list_validates_and_bumps_updated_at() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(owner, todo_list("Before")).await.unwrap();
        let updated = store
            .update_list(
                owner,
                list.id,
                TodoListChanges {
                    title: None,
                    description: Some("plans".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Before");
        assert_eq!(updated.description, "plans");
        assert!(updated.updated_at > list.updated_at);

        let err = store
            .update_list(
                owner,
                list.id,
                TodoListChanges {
                    title: Some("  ".into()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation { field: "title", .. }
        ));
    }

    #[tokio::test]
    async fn items_require_an_owned_list() {
        let db = Database::in_memory().unwrap();
        let alice = seed_user(&db, "alice@x.com");
        let bob = seed_user(&db, "bob@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(alice, todo_list("Mine")).await.unwrap();

        let err = store
            .create_item(bob, list.id, todo_item("sneaky"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store.list_items(bob, list.id, page(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store
            .create_item(alice, list.id + 100, todo_item("nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound));

        let item = store
            .create_item(alice, list.id, todo_item("real"))
            .await
            .unwrap();
        let err = store.get_item(bob, item.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store
            .update_item(bob, item.id, complete(true))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store.delete_item(bob, item.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
    }

    #[tokio::test]
    async fn completion_transitions_drive_completed_at() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(owner, todo_list("Chores")).await.unwrap();
        let item = store
            .create_item(owner, list.id, todo_item("dishes"))
            .await
            .unwrap();
        assert!(!item.is_completed);
        assert_eq!(item.completed_at, None);

        let done = store
            .update_item(owner, item.id, complete(true))
            .await
            .unwrap();
        assert!(done.is_completed);
        let stamp = done.completed_at.expect("completed_at set on completion");

        // Editing a completed item without touching the flag keeps the stamp
        let renamed = store
            .update_item(
                owner,
                item.id,
                TodoItemChanges {
                    title: Some("dishes tonight".into()),
                    ..TodoItemChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.completed_at, Some(stamp));

        // Re-sending true is not a transition
        let again = store
            .update_item(owner, item.id, complete(true))
            .await
            .unwrap();
        assert_eq!(again.completed_at, Some(stamp));

        let reopened = store
            .update_item(owner, item.id, complete(false))
            .await
            .unwrap();
        assert!(!reopened.is_completed);
        assert_eq!(reopened.completed_at, None);
    }

    #[tokio::test]
    async fn item_pagination_counts_and_markers() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(owner, todo_list("Big")).await.unwrap();
        for i in 0..25 {
            store
                .create_item(owner, list.id, todo_item(&format!("item {i}")))
                .await
                .unwrap();
        }

        let first = store.list_items(owner, list.id, page(1)).await.unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.next(), Some(2));

        let second = store.list_items(owner, list.id, page(2)).await.unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.next(), None);
    }

    #[tokio::test]
    async fn deleting_a_list_removes_its_items() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        let keep = store.create_list(owner, todo_list("Keep")).await.unwrap();
        let kept_item = store
            .create_item(owner, keep.id, todo_item("stays"))
            .await
            .unwrap();

        let drop = store.create_list(owner, todo_list("Drop")).await.unwrap();
        let dropped_item = store
            .create_item(owner, drop.id, todo_item("goes"))
            .await
            .unwrap();

        store.delete_list(owner, drop.id).await.unwrap();

        let err = store.get_item(owner, dropped_item.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        assert_eq!(
            store.get_item(owner, kept_item.id).await.unwrap().title,
            "stays"
        );
    }

    #[tokio::test]
    async fn delete_item_is_permanent() {
        let db = Database::in_memory().unwrap();
        let owner = seed_user(&db, "a@x.com");
        let store = SqliteTodoStore::new(db);

        let list = store.create_list(owner, todo_list("Chores")).await.unwrap();
        let item = store
            .create_item(owner, list.id, todo_item("once"))
            .await
            .unwrap();

        store.delete_item(owner, item.id).await.unwrap();
        let err = store.get_item(owner, item.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
        let err = store.delete_item(owner, item.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound));

        // The list itself is untouched
        assert!(store.get_list(owner, list.id).await.unwrap().items.is_empty());
    }
}
