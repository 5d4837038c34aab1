//! Refresh Token Storage
//! Mission: One durable session row per user (SQLite)

use crate::auth::models::RefreshToken;
use crate::auth::user_store::{parse_timestamp, parse_uuid};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Refresh token storage with SQLite backend.
///
/// The `user_id` UNIQUE constraint is the single-session-per-user policy:
/// a fresh login replaces the existing row's token and expiry in one
/// statement instead of inserting a second row, so two racing logins settle
/// last-writer-wins on the same row.
pub struct RefreshTokenStore {
    db_path: String,
}

impl RefreshTokenStore {
    /// Create a new token store and initialize the schema.
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
            "CREATE TABLE IF NOT EXISTS refresh_tokens (
                id TEXT PRIMARY KEY,
                token TEXT UNIQUE NOT NULL,
                user_id TEXT UNIQUE NOT NULL,
                expiry_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Look up a session row by its opaque token value.
    pub fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        self.query_one(
            "SELECT id, token, user_id, expiry_date, created_at
             FROM refresh_tokens WHERE token = ?1",
            token,
        )
    }

    /// Look up the session row owned by a user, if any.
    pub fn find_by_user(&self, user_id: &Uuid) -> Result<Option<RefreshToken>> {
        self.query_one(
            "SELECT id, token, user_id, expiry_date, created_at
             FROM refresh_tokens WHERE user_id = ?1",
            &user_id.to_string(),
        )
    }

    /// Insert the user's session row, or replace its token value and expiry
    /// when one already exists. Single statement, so each call is atomic.
    pub fn upsert(&self, user_id: &Uuid, token: &str, expiry_date: DateTime<Utc>) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO refresh_tokens (id, token, user_id, expiry_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 token = excluded.token,
                 expiry_date = excluded.expiry_date",
            params![
                Uuid::new_v4().to_string(),
                token,
                user_id.to_string(),
                expiry_date.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .context("Failed to upsert refresh token")?;

        Ok(())
    }

    /// Delete a session row by token value. Returns whether a row was
    /// actually removed, so callers can distinguish logout from replay.
    pub fn delete(&self, token: &str) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let rows_affected = conn
            .execute(
                "DELETE FROM refresh_tokens WHERE token = ?1",
                params![token],
            )
            .context("Failed to delete refresh token")?;
        Ok(rows_affected > 0)
    }

    fn query_one(&self, sql: &str, key: &str) -> Result<Option<RefreshToken>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(sql)?;

        match stmt.query_row(params![key], row_to_token) {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn row_to_token(row: &Row) -> rusqlite::Result<RefreshToken> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(2)?;
    let expiry_date: String = row.get(3)?;
    let created_at: String = row.get(4)?;

    Ok(RefreshToken {
        id: parse_uuid(&id, 0)?,
        token: row.get(1)?,
        user_id: parse_uuid(&user_id, 2)?,
        expiry_date: parse_timestamp(&expiry_date, 3)?,
        created_at: parse_timestamp(&created_at, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (RefreshTokenStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = RefreshTokenStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_upsert_inserts_then_retrieves() {
        let (store, _temp) = create_test_store();
        let user_id = Uuid::new_v4();
        let expiry = Utc::now() + Duration::days(7);

        store.upsert(&user_id, "token-a", expiry).unwrap();

        let row = store.find_by_token("token-a").unwrap().unwrap();
        assert_eq!(row.user_id, user_id);
        assert!(!row.is_expired());

        let by_user = store.find_by_user(&user_id).unwrap().unwrap();
        assert_eq!(by_user.token, "token-a");
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let (store, _temp) = create_test_store();
        let user_id = Uuid::new_v4();
        let expiry = Utc::now() + Duration::days(7);

        store.upsert(&user_id, "token-a", expiry).unwrap();
        store.upsert(&user_id, "token-b", expiry).unwrap();

        // Old value is gone, one row remains for the user
        assert!(store.find_by_token("token-a").unwrap().is_none());
        let row = store.find_by_user(&user_id).unwrap().unwrap();
        assert_eq!(row.token, "token-b");
    }

    #[test]
    fn test_delete_reports_whether_row_existed() {
        let (store, _temp) = create_test_store();
        let user_id = Uuid::new_v4();
        store
            .upsert(&user_id, "token-a", Utc::now() + Duration::days(7))
            .unwrap();

        assert!(store.delete("token-a").unwrap());
        assert!(!store.delete("token-a").unwrap());
        assert!(store.find_by_user(&user_id).unwrap().is_none());
    }

    #[test]
    fn test_expired_row_is_detected() {
        let (store, _temp) = create_test_store();
        let user_id = Uuid::new_v4();
        store
            .upsert(&user_id, "stale", Utc::now() - Duration::minutes(1))
            .unwrap();

        let row = store.find_by_token("stale").unwrap().unwrap();
        assert!(row.is_expired());
    }
}
