//! Reader accounts
//!
//! Passwords are stored as blake3 digests only.

use super::Store;
use crate::error::{NntpError, Result};
use rusqlite::{OptionalExtension, params};

fn digest(pass: &str) -> blake3::Hash {
    blake3::hash(pass.as_bytes())
}

impl Store {
    /// Create a user, or reset the password of an existing one
    pub async fn create_user(&self, name: &str, pass: &str) -> Result<()> {
        let digest = digest(pass).to_hex().to_string();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (name, pass_digest) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET pass_digest = excluded.pass_digest",
            params![name, digest],
        )?;
        Ok(())
    }

    /// Whether `name` exists and `pass` matches its stored digest
    pub async fn verify_user(&self, name: &str, pass: &str) -> Result<bool> {
        let stored: Option<String> = {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT pass_digest FROM users WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
        };
        let Some(stored) = stored else {
            return Ok(false);
        };
        let stored = blake3::Hash::from_hex(&stored)
            .map_err(|e| NntpError::Other(format!("corrupt digest for user {}: {}", name, e)))?;
        // Hash equality is constant time
        Ok(stored == digest(pass))
    }
}
