use std::sync::Arc;

use quill_core::{
    AccountStore, Database, HashingParams, NoteStore, PasswordHasher, SqliteAccountStore,
    SqliteNoteStore, SqliteTodoStore, TodoStore,
};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub notes: Arc<dyn NoteStore>,
    pub todos: Arc<dyn TodoStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // One shared handle so account deletion cascades reach every table
        let db = Database::open(&config.database.path)?;

        let hasher = PasswordHasher::new(HashingParams {
            memory_kib: config.password.memory_kib,
            iterations: config.password.iterations,
            parallelism: config.password.parallelism,
        })?;

        Ok(Self {
            accounts: Arc::new(SqliteAccountStore::new(db.clone(), hasher)),
            notes: Arc::new(SqliteNoteStore::new(db.clone())),
            todos: Arc::new(SqliteTodoStore::new(db)),
            config: Arc::new(config.clone()),
        })
    }
}
