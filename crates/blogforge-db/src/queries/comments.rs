//! Comment database queries.

use blogforge_common::{CommentId, Error, PostId, Result, UserId};
use chrono::Utc;
use rusqlite::{Connection, Row};

use super::{
    db_err, format_timestamp, optional, parse_id, parse_timestamp, profile_from_row,
    PROFILE_COLUMNS,
};
use crate::models::Comment;

fn select_comments() -> String {
    format!(
        "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, {PROFILE_COLUMNS}
         FROM comments c
         INNER JOIN users u ON c.author_id = u.id"
    )
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: parse_id(row, 0)?,
        post_id: parse_id(row, 1)?,
        author_id: parse_id(row, 2)?,
        content: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
        user: profile_from_row(row, 5)?,
    })
}

/// Add a comment to a post.
///
/// Returns `Error::NotFound` if the post does not exist.
pub fn create_comment(
    conn: &Connection,
    post_id: PostId,
    author_id: UserId,
    content: &str,
) -> Result<Comment> {
    let id = CommentId::new();

    conn.execute(
        "INSERT INTO comments (id, post_id, author_id, content, created_at)
         VALUES (:id, :post_id, :author_id, :content, :created_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":post_id": post_id.to_string(),
            ":author_id": author_id.to_string(),
            ":content": content,
            ":created_at": format_timestamp(Utc::now()),
        },
    )
    .map_err(|e| {
        if e.to_string().contains("FOREIGN KEY constraint failed") {
            Error::not_found("post", post_id)
        } else {
            db_err(e)
        }
    })?;

    get_comment(conn, id)?.ok_or_else(|| Error::not_found("comment", id))
}

/// Get a comment by ID.
pub fn get_comment(conn: &Connection, id: CommentId) -> Result<Option<Comment>> {
    optional(conn.query_row(
        &format!("{} WHERE c.id = :id", select_comments()),
        rusqlite::named_params! { ":id": id.to_string() },
        comment_from_row,
    ))
}

/// List a post's comments, oldest first.
pub fn list_comments_for_post(conn: &Connection, post_id: PostId) -> Result<Vec<Comment>> {
    let mut stmt = conn
        .prepare(&format!(
            "{} WHERE c.post_id = :post_id ORDER BY c.created_at ASC, c.rowid ASC",
            select_comments()
        ))
        .map_err(db_err)?;

    let rows = stmt
        .query_map(
            rusqlite::named_params! { ":post_id": post_id.to_string() },
            comment_from_row,
        )
        .map_err(db_err)?;

    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

/// Delete a comment. Returns `false` if it did not exist.
pub fn delete_comment(conn: &Connection, id: CommentId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM comments WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(db_err)?;

    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::{posts, test_support};

    #[test]
    fn test_create_comment() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let ada = test_support::user(&conn, "ada@example.com");
        let bob = test_support::user(&conn, "bob@example.com");
        let post = test_support::post(&conn, &ada, "hello");

        let comment = create_comment(&conn, post.id, bob.id, "Nice post").unwrap();
        assert_eq!(comment.post_id, post.id);
        assert_eq!(comment.author_id, bob.id);
        assert_eq!(comment.user.email, "bob@example.com");
        assert_eq!(comment.content, "Nice post");
    }

    #[test]
    fn test_comment_on_missing_post() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let ada = test_support::user(&conn, "ada@example.com");

        let err = create_comment(&conn, PostId::new(), ada.id, "hi").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_list_comments_oldest_first() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let ada = test_support::user(&conn, "ada@example.com");
        let post = test_support::post(&conn, &ada, "hello");
        let other = test_support::post(&conn, &ada, "other");

        create_comment(&conn, post.id, ada.id, "first").unwrap();
        create_comment(&conn, post.id, ada.id, "second").unwrap();
        create_comment(&conn, other.id, ada.id, "elsewhere").unwrap();

        let contents: Vec<String> = list_comments_for_post(&conn, post.id)
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_delete_comment() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let ada = test_support::user(&conn, "ada@example.com");
        let post = test_support::post(&conn, &ada, "hello");
        let comment = create_comment(&conn, post.id, ada.id, "bye").unwrap();

        assert!(delete_comment(&conn, comment.id).unwrap());
        assert!(!delete_comment(&conn, comment.id).unwrap());
        assert!(get_comment(&conn, comment.id).unwrap().is_none());
    }

    #[test]
    fn test_comments_removed_with_post() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let ada = test_support::user(&conn, "ada@example.com");
        let post = test_support::post(&conn, &ada, "hello");
        let comment = create_comment(&conn, post.id, ada.id, "c").unwrap();

        posts::delete_post(&conn, post.id).unwrap();
        assert!(get_comment(&conn, comment.id).unwrap().is_none());
        assert!(list_comments_for_post(&conn, post.id).unwrap().is_empty());
    }
}
