//! quill-core: Accounts, token auth, and owner-scoped storage
//!
//! Provides credential and token management plus note and todo
//! repositories for the quill backend. Every read and write is scoped
//! to an owner; callers can never reach another user's rows.
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_core::{
//!     AccountStore, Database, Email, HashingParams, NewAccount, NewNote,
//!     NoteStore, PasswordHasher, SqliteAccountStore, SqliteNoteStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("quill.db")?;
//!     let hasher = PasswordHasher::new(HashingParams::default())?;
//!     let accounts = SqliteAccountStore::new(db.clone(), hasher);
//!     let notes = SqliteNoteStore::new(db);
//!
//!     let (account, token) = accounts
//!         .register(NewAccount {
//!             email: Email::parse("ada@example.com")?,
//!             password: "Passw0rd".into(),
//!             first_name: "Ada".into(),
//!             last_name: "Lovelace".into(),
//!         })
//!         .await?;
//!
//!     // The token authenticates later requests
//!     let user = accounts.resolve_token(&token.value).await?;
//!     assert_eq!(user, account.id);
//!
//!     notes
//!         .create(
//!             account.id,
//!             NewNote {
//!                 title: "First note".into(),
//!                 content: String::new(),
//!             },
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod account;
mod error;
mod fields;
mod note;
mod page;
mod password;
mod todo;
mod token;

pub mod sqlite;

// Re-exports
pub use account::{Account, AccountStore, AuthToken, Email, NewAccount, ProfileUpdate, UserId};
pub use error::{CoreError, CoreResult};
pub use note::{NewNote, Note, NoteChanges, NoteFilter, NoteStore};
pub use page::{PAGE_SIZE, Page, PageRequest};
pub use password::{HashingParams, PasswordHasher, PasswordRule, validate_password};
pub use todo::{
    NewTodoItem, NewTodoList, TodoItem, TodoItemChanges, TodoList, TodoListChanges, TodoStore,
};

pub use sqlite::{Database, SqliteAccountStore, SqliteNoteStore, SqliteTodoStore};
