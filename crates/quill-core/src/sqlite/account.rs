//! SQLite account store

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::{Database, is_unique_violation, now_micros};
use crate::account::{Account, AccountStore, AuthToken, NewAccount, ProfileUpdate, UserId};
use crate::error::{CoreError, CoreResult};
use crate::password::{PasswordHasher, validate_password};
use crate::token::{generate_token, token_digest};

const ACCOUNT_COLS: &str = "id, email, first_name, last_name, created_at";

/// SQLite-backed credential store and token issuer
pub struct SqliteAccountStore {
    db: Database,
    hasher: PasswordHasher,
}

impl SqliteAccountStore {
    pub fn new(db: Database, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    fn password_hash_of(&self, user: UserId) -> CoreResult<String> {
        let conn = self.db.lock();
        conn.query_row(
            "SELECT password_hash FROM users WHERE id = ?",
            [user.get()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(CoreError::NotFound)
    }
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: UserId::new(row.get(0)?),
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn get_or_create_token(conn: &Connection, user: UserId) -> CoreResult<AuthToken> {
    let token = generate_token();
    let digest = token_digest(&token);
    // tokens.user_id is the primary key: a concurrent issuance loses the
    // insert and the re-read below returns the winner's row.
    conn.execute(
        "INSERT OR IGNORE INTO tokens (user_id, token, digest, created_at) VALUES (?, ?, ?, ?)",
        (user.get(), &token, digest.as_slice(), now_micros()),
    )?;
    let (value, created_at) = conn.query_row(
        "SELECT token, created_at FROM tokens WHERE user_id = ?",
        [user.get()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(AuthToken { value, created_at })
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn register(&self, new: NewAccount) -> CoreResult<(Account, AuthToken)> {
        {
            let conn = self.db.lock();
            let taken: Option<i64> = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?",
                    [new.email.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(CoreError::EmailTaken);
            }
        }

        if let Some(rule) = validate_password(&new.password).first() {
            return Err(CoreError::WeakPassword(*rule));
        }

        // Slow hash runs outside the connection lock
        let password_hash = self.hasher.hash(&new.password)?;
        let token = generate_token();
        let digest = token_digest(&token);
        let now = now_micros();

        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            r#"INSERT INTO users (email, password_hash, first_name, last_name, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
            (
                new.email.as_str(),
                &password_hash,
                &new.first_name,
                &new.last_name,
                now,
            ),
        );
        if let Err(err) = inserted {
            // The unique email column also catches a registration that
            // raced past the precheck
            if is_unique_violation(&err) {
                return Err(CoreError::EmailTaken);
            }
            return Err(err.into());
        }
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO tokens (user_id, token, digest, created_at) VALUES (?, ?, ?, ?)",
            (id, &token, digest.as_slice(), now),
        )?;
        tx.commit()?;

        Ok((
            Account {
                id: UserId::new(id),
                email: new.email.into_string(),
                first_name: new.first_name,
                last_name: new.last_name,
                created_at: now,
            },
            AuthToken {
                value: token,
                created_at: now,
            },
        ))
    }

    async fn login(&self, email: &str, password: &str) -> CoreResult<(Account, AuthToken)> {
        let normalized = email.trim().to_lowercase();

        let row: Option<(Account, String)> = {
            let conn = self.db.lock();
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLS}, password_hash FROM users WHERE email = ?"),
                [&normalized],
                |row| Ok((account_from_row(row)?, row.get(5)?)),
            )
            .optional()?
        };

        let Some((account, stored_hash)) = row else {
            // Burn one hashing round so an unknown email costs the same as
            // a wrong password
            let _ = self.hasher.hash(password);
            return Err(CoreError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &stored_hash) {
            return Err(CoreError::InvalidCredentials);
        }

        let conn = self.db.lock();
        let token = get_or_create_token(&conn, account.id)?;
        Ok((account, token))
    }

    async fn resolve_token(&self, token: &str) -> CoreResult<UserId> {
        let digest = token_digest(token);
        let conn = self.db.lock();
        let id: Option<i64> = conn
            .query_row(
                "SELECT user_id FROM tokens WHERE digest = ?",
                [digest.as_slice()],
                |row| row.get(0),
            )
            .optional()?;
        id.map(UserId::new).ok_or(CoreError::InvalidToken)
    }

    async fn account(&self, user: UserId) -> CoreResult<Account> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {ACCOUNT_COLS} FROM users WHERE id = ?"),
            [user.get()],
            account_from_row,
        )
        .optional()?
        .ok_or(CoreError::NotFound)
    }

    async fn update_profile(&self, user: UserId, update: ProfileUpdate) -> CoreResult<Account> {
        let conn = self.db.lock();
        let changed = conn.execute(
            r#"UPDATE users
               SET first_name = COALESCE(?, first_name),
                   last_name = COALESCE(?, last_name)
               WHERE id = ?"#,
            (
                update.first_name.as_deref(),
                update.last_name.as_deref(),
                user.get(),
            ),
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound);
        }
        let account = conn.query_row(
            &format!("SELECT {ACCOUNT_COLS} FROM users WHERE id = ?"),
            [user.get()],
            account_from_row,
        )?;
        Ok(account)
    }

    async fn change_password(&self, user: UserId, old: &str, new: &str) -> CoreResult<()> {
        let stored = self.password_hash_of(user)?;
        if !self.hasher.verify(old, &stored) {
            return Err(CoreError::InvalidCredentials);
        }
        if let Some(rule) = validate_password(new).first() {
            return Err(CoreError::WeakPassword(*rule));
        }
        let password_hash = self.hasher.hash(new)?;
        let conn = self.db.lock();
        conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            (&password_hash, user.get()),
        )?;
        Ok(())
    }

    async fn delete_account(&self, user: UserId, password: &str) -> CoreResult<()> {
        let stored = self.password_hash_of(user)?;
        if !self.hasher.verify(password, &stored) {
            return Err(CoreError::InvalidCredentials);
        }
        let conn = self.db.lock();
        // Cascades take the token, notes, lists, and items with the row
        conn.execute("DELETE FROM users WHERE id = ?", [user.get()])?;
        Ok(())
    }
}
