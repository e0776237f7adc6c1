//! Database query modules.
//!
//! - users: account CRUD and profile updates
//! - auth_tokens: login session tokens
//! - posts: blog posts, joined with their author
//! - comments: comments on posts, joined with their author

pub mod auth_tokens;
pub mod comments;
pub mod posts;
pub mod users;

use blogforge_common::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use crate::models::PublicProfile;

/// Timestamps are stored as fixed-width RFC 3339 strings so that they sort
/// lexicographically.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_id<T: From<Uuid>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map(T::from)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Columns read by [`profile_from_row`], for a `users` table aliased as `u`.
pub(crate) const PROFILE_COLUMNS: &str = "u.id, u.email, u.full_name, u.avatar_url";

pub(crate) fn profile_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<PublicProfile> {
    Ok(PublicProfile {
        id: parse_id(row, offset)?,
        email: row.get(offset + 1)?,
        full_name: row.get(offset + 2)?,
        avatar_url: row.get(offset + 3)?,
    })
}

pub(crate) fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Unwrap an optional single-row lookup.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> blogforge_common::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(db_err(e)),
    }
}
