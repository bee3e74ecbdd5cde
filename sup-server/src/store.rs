//! Client dello store dei documenti (utenti e messaggi) su SQLite.
//!
//! Lo `Store` viene costruito esplicitamente all'avvio e passato agli handler
//! tramite `AppState`; nessuna connessione globale.

use anyhow::Context;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::path::{Path, PathBuf};
use sup_core::{new_id, ExpandedMessage, Message, MessageFilter, User};

// Dato un percorso di file, restituisce un URL SQLite valido.
// Crea le directory genitrici se non esistono.
pub fn sqlite_url_for_path(p: &Path) -> anyhow::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&abs)
        .with_context(|| format!("create/open sqlite file {:?}", abs))?;
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite:///{}", s))
}

/// Trasforma il valore configurato (percorso o URL) in un URL SQLite.
/// "sqlite::memory:" viene passato così com'è.
pub fn build_sqlite_url(raw: &str) -> anyhow::Result<String> {
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }
    // Rimuovi il prefisso "sqlite://" (o "sqlite:") se presente, per ottenere il percorso del file.
    // sqlite:///abs/path -> /abs/path
    let path_part = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);
    sqlite_url_for_path(&PathBuf::from(path_part))
}

const USER_COLUMNS: &str = "user_id, username, password_hash";

const EXPANDED_MESSAGE_SELECT: &str = r#"
    SELECT m.message_id, m.text,
           f.user_id AS from_user_id, f.username AS from_username,
           f.password_hash AS from_password_hash,
           t.user_id AS to_user_id, t.username AS to_username,
           t.password_hash AS to_password_hash
    FROM messages m
    LEFT JOIN users f ON f.user_id = m.from_id
    LEFT JOIN users t ON t.user_id = m.to_id
"#;

#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    // Connect to the database and return a store backed by a connection pool.
    pub async fn connect(db_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(db_url)
            .await
            .with_context(|| format!("connect to sqlite via {}", db_url))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // Crea le collezioni se non esistono. Niente foreign key: i riferimenti
    // di un messaggio possono restare pendenti dopo la cancellazione di un utente.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let stmts = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id       TEXT PRIMARY KEY,
                username      TEXT NOT NULL,
                password_hash TEXT
            );"#,
            r#"
            CREATE INDEX IF NOT EXISTS users_username ON users (username);"#,
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                message_id TEXT PRIMARY KEY,
                from_id    TEXT NOT NULL,
                to_id      TEXT NOT NULL,
                text       TEXT NOT NULL
            );"#,
        ];
        for s in &stmts {
            sqlx::query(s)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("apply migration: {}", &s[..s.len().min(40)].replace('\n', " "))
                })?;
        }
        Ok(())
    }

    /// Controlla lo stato di salute del database tentando di acquisire una connessione dal pool.
    pub async fn health(&self) -> Result<(), sqlx::Error> {
        self.pool.acquire().await.map(|_| ())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| user_from_row(row, "")).collect()
    }

    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let user = User {
            id: new_id(),
            username: username.to_string(),
            password_hash: Some(password_hash.to_string()),
        };
        sqlx::query("INSERT INTO users (user_id, username, password_hash) VALUES (?, ?, ?)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| user_from_row(&r, "")).transpose()
    }

    /// Primo utente con questo username (l'unicità non è garantita).
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? ORDER BY rowid LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| user_from_row(&r, "")).transpose()
    }

    /// Update-or-insert keyed by id. Only the username changes; an existing
    /// hash is kept, a freshly inserted user has none.
    pub async fn upsert_user(&self, id: &str, username: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (user_id, username, password_hash) VALUES (?, ?, NULL)
             ON CONFLICT(user_id) DO UPDATE SET username = excluded.username",
        )
        .bind(id)
        .bind(username)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Restituisce `false` se non esisteva nessun utente con quell'id.
    pub async fn delete_user(&self, id: &str) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn insert_message(
        &self,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<Message, sqlx::Error> {
        let message = Message {
            id: new_id(),
            from: from.to_string(),
            to: to.to_string(),
            text: text.to_string(),
        };
        sqlx::query("INSERT INTO messages (message_id, from_id, to_id, text) VALUES (?, ?, ?, ?)")
            .bind(&message.id)
            .bind(&message.from)
            .bind(&message.to)
            .bind(&message.text)
            .execute(&self.pool)
            .await?;
        Ok(message)
    }

    pub async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> Result<Vec<ExpandedMessage>, sqlx::Error> {
        let sql = format!(
            "{EXPANDED_MESSAGE_SELECT}
             WHERE (?1 IS NULL OR m.to_id = ?1) AND (?2 IS NULL OR m.from_id = ?2)
             ORDER BY m.rowid"
        );
        let rows = sqlx::query(&sql)
            .bind(&filter.to)
            .bind(&filter.from)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(expanded_message_from_row).collect()
    }

    pub async fn find_message(&self, id: &str) -> Result<Option<ExpandedMessage>, sqlx::Error> {
        let row = sqlx::query(&format!("{EXPANDED_MESSAGE_SELECT} WHERE m.message_id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(expanded_message_from_row).transpose()
    }
}

fn user_from_row(row: &SqliteRow, prefix: &str) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get(format!("{prefix}user_id").as_str())?,
        username: row.try_get(format!("{prefix}username").as_str())?,
        password_hash: row.try_get(format!("{prefix}password_hash").as_str())?,
    })
}

// LEFT JOIN: se l'utente non esiste più le colonne sono NULL
fn joined_user(row: &SqliteRow, prefix: &str) -> Result<Option<User>, sqlx::Error> {
    let id: Option<String> = row.try_get(format!("{prefix}user_id").as_str())?;
    match id {
        Some(_) => user_from_row(row, prefix).map(Some),
        None => Ok(None),
    }
}

fn expanded_message_from_row(row: &SqliteRow) -> Result<ExpandedMessage, sqlx::Error> {
    Ok(Message {
        id: row.try_get("message_id")?,
        from: joined_user(row, "from_")?,
        to: joined_user(row, "to_")?,
        text: row.try_get("text")?,
    })
}
