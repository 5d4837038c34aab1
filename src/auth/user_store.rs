//! User Storage
//! Mission: Durable user accounts with soft-delete-aware lookups (SQLite)

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, Row};
use tracing::info;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, full_name, phone, password_hash, role, is_deleted, created_at, last_login";

/// User storage with SQLite backend.
///
/// Email is unique across ALL rows: a soft-deleted account still occupies
/// its email, which is what makes reactivation (rather than re-creation)
/// possible on re-signup.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                full_name TEXT NOT NULL,
                phone TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_login TEXT
            )",
            [],
        )?;

        Ok(())
    }

    /// Look up a user by email regardless of deletion state.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            email,
        )
    }

    /// Look up an active (not soft-deleted) user by email. Login uses this,
    /// so deactivated accounts are invisible to credential checks.
    pub fn find_active_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND is_deleted = 0"),
            email,
        )
    }

    /// Look up a user by id regardless of deletion state.
    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            &id.to_string(),
        )
    }

    pub fn exists_by_email(&self, email: &str) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .context("Failed to check email existence")?;
        Ok(count > 0)
    }

    /// Insert a new user row.
    pub fn create(&self, user: &User) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, email, full_name, phone, password_hash, role, is_deleted, created_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id.to_string(),
                user.email,
                user.full_name,
                user.phone,
                user.password_hash,
                user.role.as_str(),
                user.is_deleted as i64,
                user.created_at.to_rfc3339(),
                user.last_login.map(|t| t.to_rfc3339()),
            ],
        )
        .context("Failed to insert user")?;

        info!("Created user: {} ({})", user.email, user.role.as_str());
        Ok(())
    }

    /// Persist changes to an existing row, keyed by id. The row identity is
    /// preserved across reactivation and soft deletion.
    pub fn update(&self, user: &User) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        let rows_affected = conn
            .execute(
                "UPDATE users
                 SET email = ?2, full_name = ?3, phone = ?4, password_hash = ?5,
                     role = ?6, is_deleted = ?7, last_login = ?8
                 WHERE id = ?1",
                params![
                    user.id.to_string(),
                    user.email,
                    user.full_name,
                    user.phone,
                    user.password_hash,
                    user.role.as_str(),
                    user.is_deleted as i64,
                    user.last_login.map(|t| t.to_rfc3339()),
                ],
            )
            .context("Failed to update user")?;

        if rows_affected == 0 {
            anyhow::bail!("User not found: {}", user.id);
        }
        Ok(())
    }

    fn query_one(&self, sql: &str, key: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(sql)?;

        match stmt.query_row(params![key], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let role: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    let last_login: Option<String> = row.get(8)?;

    Ok(User {
        id: parse_uuid(&id, 0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        role: UserRole::from_str(&role).unwrap_or(UserRole::Customer),
        is_deleted: row.get::<_, i64>(6)? != 0,
        created_at: parse_timestamp(&created_at, 7)?,
        last_login: last_login.as_deref().map(|s| parse_timestamp(s, 8)).transpose()?,
    })
}

pub(crate) fn parse_uuid(value: &str, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_timestamp(value: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
