//! SQLite note store

use async_trait::async_trait;
use rusqlite::OptionalExtension;

use super::{Database, now_micros};
use crate::account::UserId;
use crate::error::{CoreError, CoreResult};
use crate::fields::{check_body, normalize_title};
use crate::note::{NewNote, Note, NoteChanges, NoteFilter, NoteStore};
use crate::page::{PAGE_SIZE, Page, PageRequest, last_page};

const NOTE_COLS: &str = "id, user_id, title, content, created_at, updated_at";

/// SQLite-backed note repository, scoped to one owner per call
pub struct SqliteNoteStore {
    db: Database,
}

impl SqliteNoteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        owner: UserId::new(row.get(1)?),
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Wraps a search needle in `%`, escaping LIKE metacharacters so they
/// match literally. LIKE itself is ASCII case-insensitive.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn create(&self, owner: UserId, new: NewNote) -> CoreResult<Note> {
        let title = normalize_title("title", &new.title)?;
        check_body("content", &new.content)?;
        let now = now_micros();

        let conn = self.db.lock();
        conn.execute(
            r#"INSERT INTO notes (user_id, title, content, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
            (owner.get(), &title, &new.content, now, now),
        )?;
        Ok(Note {
            id: conn.last_insert_rowid(),
            owner,
            title,
            content: new.content,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, owner: UserId, id: i64) -> CoreResult<Note> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {NOTE_COLS} FROM notes WHERE id = ? AND user_id = ?"),
            (id, owner.get()),
            note_from_row,
        )
        .optional()?
        .ok_or(CoreError::NotFound)
    }

    async fn list(
        &self,
        owner: UserId,
        filter: &NoteFilter,
        page: PageRequest,
    ) -> CoreResult<Page<Note>> {
        let pattern = filter.search.as_deref().map(like_pattern);
        let conn = self.db.lock();

        let total: u64 = conn.query_row(
            r#"SELECT COUNT(*) FROM notes
               WHERE user_id = ?1
                 AND (?2 IS NULL OR title LIKE ?2 ESCAPE '\' OR content LIKE ?2 ESCAPE '\')"#,
            (owner.get(), pattern.as_deref()),
            |row| row.get(0),
        )?;
        if page.number() > last_page(total) {
            return Err(CoreError::NotFound);
        }

        let mut stmt = conn.prepare(&format!(
            r#"SELECT {NOTE_COLS} FROM notes
               WHERE user_id = ?1
                 AND (?2 IS NULL OR title LIKE ?2 ESCAPE '\' OR content LIKE ?2 ESCAPE '\')
               ORDER BY updated_at DESC, id DESC
               LIMIT ?3 OFFSET ?4"#
        ))?;
        let items = stmt
            .query_map(
                (
                    owner.get(),
                    pattern.as_deref(),
                    PAGE_SIZE as i64,
                    page.offset() as i64,
                ),
                note_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            number: page.number(),
        })
    }

    async fn update(&self, owner: UserId, id: i64, changes: NoteChanges) -> CoreResult<Note> {
        let conn = self.db.lock();
        let existing = conn
            .query_row(
                &format!("SELECT {NOTE_COLS} FROM notes WHERE id = ? AND user_id = ?"),
                (id, owner.get()),
                note_from_row,
            )
            .optional()?
            .ok_or(CoreError::NotFound)?;

        let title = match changes.title {
            Some(raw) => normalize_title("title", &raw)?,
            None => existing.title,
        };
        let content = match changes.content {
            Some(value) => {
                check_body("content", &value)?;
                value
            }
            None => existing.content,
        };
        // Always strictly after the stored value, even within one clock tick
        let updated_at = now_micros().max(existing.updated_at + 1);

        conn.execute(
            "UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ?",
            (&title, &content, updated_at, id),
        )?;
        Ok(Note {
            id,
            owner,
            title,
            content,
            created_at: existing.created_at,
            updated_at,
        })
    }

    async fn delete(&self, owner: UserId, id: i64) -> CoreResult<()> {
        let conn = self.db.lock();
        let deleted = conn.execute(
            "DELETE FROM notes WHERE id = ? AND user_id = ?",
            (id, owner.get()),
        )?;
        if deleted == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }
}
