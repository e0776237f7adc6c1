//! Authentication token database queries.
//!
//! Opaque bearer tokens issued at login and registration. A token maps to
//! exactly one user and carries its own expiry.

use blogforge_common::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::{db_err, format_timestamp, optional, parse_id, parse_timestamp};
use crate::models::{AuthToken, User};

/// Store a new session token for `user_id`.
pub fn create_token(
    conn: &Connection,
    user_id: blogforge_common::UserId,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<AuthToken> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO auth_tokens (token, user_id, created_at, expires_at)
         VALUES (:token, :user_id, :created_at, :expires_at)",
        rusqlite::named_params! {
            ":token": token,
            ":user_id": user_id.to_string(),
            ":created_at": format_timestamp(now),
            ":expires_at": format_timestamp(expires_at),
        },
    )
    .map_err(db_err)?;

    Ok(AuthToken {
        token: token.to_string(),
        user_id,
        created_at: now,
        expires_at,
    })
}

/// Get a token and the user it belongs to.
///
/// Expiry is not checked here; see [`AuthToken::is_valid_at`].
pub fn get_token_with_user(conn: &Connection, token: &str) -> Result<Option<(AuthToken, User)>> {
    optional(conn.query_row(
        "SELECT
            t.token, t.user_id, t.created_at, t.expires_at,
            u.id, u.email, u.password_hash, u.full_name, u.avatar_url, u.created_at, u.updated_at
         FROM auth_tokens t
         INNER JOIN users u ON t.user_id = u.id
         WHERE t.token = :token",
        rusqlite::named_params! { ":token": token },
        |row| {
            let auth_token = AuthToken {
                token: row.get(0)?,
                user_id: parse_id(row, 1)?,
                created_at: parse_timestamp(row, 2)?,
                expires_at: parse_timestamp(row, 3)?,
            };

            let user = User {
                id: parse_id(row, 4)?,
                email: row.get(5)?,
                password_hash: row.get(6)?,
                full_name: row.get(7)?,
                avatar_url: row.get(8)?,
                created_at: parse_timestamp(row, 9)?,
                updated_at: parse_timestamp(row, 10)?,
            };

            Ok((auth_token, user))
        },
    ))
}

/// Delete a token (logout). Returns `false` if it did not exist.
pub fn delete_token(conn: &Connection, token: &str) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM auth_tokens WHERE token = :token",
            rusqlite::named_params! { ":token": token },
        )
        .map_err(db_err)?;

    Ok(rows_affected > 0)
}

/// Delete every token that expired before `now`. Returns how many were removed.
pub fn delete_expired_tokens(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM auth_tokens WHERE expires_at <= :now",
        rusqlite::named_params! { ":now": format_timestamp(now) },
    )
    .map_err(db_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::test_support;
    use chrono::Duration;

    #[test]
    fn test_create_and_lookup_token() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = test_support::user(&conn, "ada@example.com");

        let expires = Utc::now() + Duration::hours(1);
        create_token(&conn, user.id, "tok-1", expires).unwrap();

        let (token, owner) = get_token_with_user(&conn, "tok-1").unwrap().unwrap();
        assert_eq!(token.user_id, user.id);
        assert_eq!(owner.email, "ada@example.com");
        assert!(token.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_unknown_token() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(get_token_with_user(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_delete_token() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = test_support::user(&conn, "ada@example.com");

        create_token(&conn, user.id, "tok-1", Utc::now() + Duration::hours(1)).unwrap();
        assert!(delete_token(&conn, "tok-1").unwrap());
        assert!(!delete_token(&conn, "tok-1").unwrap());
        assert!(get_token_with_user(&conn, "tok-1").unwrap().is_none());
    }

    #[test]
    fn test_delete_expired_tokens() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = test_support::user(&conn, "ada@example.com");

        let now = Utc::now();
        create_token(&conn, user.id, "old", now - Duration::hours(1)).unwrap();
        create_token(&conn, user.id, "fresh", now + Duration::hours(1)).unwrap();

        assert_eq!(delete_expired_tokens(&conn, now).unwrap(), 1);
        assert!(get_token_with_user(&conn, "old").unwrap().is_none());
        assert!(get_token_with_user(&conn, "fresh").unwrap().is_some());
    }

    #[test]
    fn test_tokens_removed_with_user() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = test_support::user(&conn, "ada@example.com");

        create_token(&conn, user.id, "tok", Utc::now() + Duration::hours(1)).unwrap();
        crate::queries::users::delete_user(&conn, user.id).unwrap();
        assert!(get_token_with_user(&conn, "tok").unwrap().is_none());
    }
}
