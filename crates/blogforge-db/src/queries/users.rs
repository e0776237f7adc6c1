//! User database queries.
//!
//! Account creation, lookup by ID or email, and profile updates.

use blogforge_common::{Error, Result, UserId};
use chrono::Utc;
use rusqlite::{Connection, Row};

use super::{db_err, format_timestamp, optional, parse_id, parse_timestamp};
use crate::models::User;

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, avatar_url, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_id(row, 0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        avatar_url: row.get(4)?,
        created_at: parse_timestamp(row, 5)?,
        updated_at: parse_timestamp(row, 6)?,
    })
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a new user.
///
/// The email is trimmed and lowercased before storage.
///
/// # Returns
///
/// * `Ok(User)` - The created user
/// * `Err(Error::Conflict)` - If the email is already registered
/// * `Err(Error)` - On any other database error
pub fn create_user(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
) -> Result<User> {
    let id = UserId::new();
    let now = Utc::now();
    let email = normalize_email(email);

    conn.execute(
        "INSERT INTO users (id, email, password_hash, full_name, avatar_url, created_at, updated_at)
         VALUES (:id, :email, :password_hash, :full_name, NULL, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":email": email,
            ":password_hash": password_hash,
            ":full_name": full_name,
            ":created_at": format_timestamp(now),
            ":updated_at": format_timestamp(now),
        },
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::Conflict("User already registered".to_string())
        } else {
            db_err(e)
        }
    })?;

    Ok(User {
        id,
        email,
        password_hash: password_hash.to_string(),
        full_name: full_name.map(String::from),
        avatar_url: None,
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    optional(conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = :id"),
        rusqlite::named_params! { ":id": id.to_string() },
        user_from_row,
    ))
}

/// Get a user by email (case-insensitive).
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    optional(conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = :email"),
        rusqlite::named_params! { ":email": normalize_email(email) },
        user_from_row,
    ))
}

/// Update a user's public profile fields and return the stored user.
///
/// Both fields are overwritten; pass the current value to keep it.
pub fn update_profile(
    conn: &Connection,
    id: UserId,
    full_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<User> {
    let rows_affected = conn
        .execute(
            "UPDATE users SET full_name = :full_name, avatar_url = :avatar_url,
                              updated_at = :updated_at
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": id.to_string(),
                ":full_name": full_name,
                ":avatar_url": avatar_url,
                ":updated_at": format_timestamp(Utc::now()),
            },
        )
        .map_err(db_err)?;

    if rows_affected == 0 {
        return Err(Error::not_found("user", id));
    }

    get_user(conn, id)?.ok_or_else(|| Error::not_found("user", id))
}

/// Update a user's password hash.
pub fn update_password(conn: &Connection, id: UserId, password_hash: &str) -> Result<()> {
    let rows_affected = conn
        .execute(
            "UPDATE users SET password_hash = :password_hash, updated_at = :updated_at
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": id.to_string(),
                ":password_hash": password_hash,
                ":updated_at": format_timestamp(Utc::now()),
            },
        )
        .map_err(db_err)?;

    if rows_affected == 0 {
        return Err(Error::not_found("user", id));
    }

    Ok(())
}

/// Delete a user together with their posts, comments and sessions.
///
/// Returns `false` if the user did not exist.
pub fn delete_user(conn: &Connection, id: UserId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM users WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(db_err)?;

    Ok(rows_affected > 0)
}
