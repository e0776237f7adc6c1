//! Blog post database queries.
//!
//! Every read joins the author's public profile so callers never need a
//! second lookup to render a post.

use blogforge_common::{Error, PostId, Result, UserId};
use chrono::Utc;
use rusqlite::{Connection, Row};

use super::{
    db_err, format_timestamp, optional, parse_id, parse_timestamp, profile_from_row,
    PROFILE_COLUMNS,
};
use crate::models::{NewPost, Post, PostChanges};

fn select_posts() -> String {
    format!(
        "SELECT p.id, p.title, p.content, p.image_url, p.author_id, p.created_at, p.updated_at,
                {PROFILE_COLUMNS}
         FROM posts p
         INNER JOIN users u ON p.author_id = u.id"
    )
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: parse_id(row, 0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        author_id: parse_id(row, 4)?,
        created_at: parse_timestamp(row, 5)?,
        updated_at: parse_timestamp(row, 6)?,
        user: profile_from_row(row, 7)?,
    })
}

/// Create a post and return it joined with its author.
pub fn create_post(conn: &Connection, post: &NewPost) -> Result<Post> {
    let id = PostId::new();
    let now = format_timestamp(Utc::now());

    conn.execute(
        "INSERT INTO posts (id, title, content, image_url, author_id, created_at, updated_at)
         VALUES (:id, :title, :content, :image_url, :author_id, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":title": post.title,
            ":content": post.content,
            ":image_url": post.image_url,
            ":author_id": post.author_id.to_string(),
            ":created_at": now,
            ":updated_at": now,
        },
    )
    .map_err(|e| {
        if e.to_string().contains("FOREIGN KEY constraint failed") {
            Error::not_found("user", post.author_id)
        } else {
            db_err(e)
        }
    })?;

    get_post(conn, id)?.ok_or_else(|| Error::not_found("post", id))
}

/// Get a post by ID.
pub fn get_post(conn: &Connection, id: PostId) -> Result<Option<Post>> {
    optional(conn.query_row(
        &format!("{} WHERE p.id = :id", select_posts()),
        rusqlite::named_params! { ":id": id.to_string() },
        post_from_row,
    ))
}

/// List posts newest first, optionally restricted to one author.
pub fn list_posts(
    conn: &Connection,
    author: Option<UserId>,
    limit: u32,
    offset: u32,
) -> Result<Vec<Post>> {
    let mut sql = select_posts();
    if author.is_some() {
        sql.push_str(" WHERE p.author_id = :author_id");
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.rowid DESC LIMIT :limit OFFSET :offset");

    let mut stmt = conn.prepare(&sql).map_err(db_err)?;
    let author = author.map(|id| id.to_string());

    let rows = match &author {
        Some(author_id) => stmt.query_map(
            rusqlite::named_params! {
                ":author_id": author_id,
                ":limit": limit,
                ":offset": offset,
            },
            post_from_row,
        ),
        None => stmt.query_map(
            rusqlite::named_params! { ":limit": limit, ":offset": offset },
            post_from_row,
        ),
    }
    .map_err(db_err)?;

    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

/// Count posts, optionally restricted to one author.
pub fn count_posts(conn: &Connection, author: Option<UserId>) -> Result<u64> {
    let count: i64 = match author {
        Some(author_id) => conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE author_id = :author_id",
            rusqlite::named_params! { ":author_id": author_id.to_string() },
            |row| row.get(0),
        ),
        None => conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0)),
    }
    .map_err(db_err)?;

    Ok(count.max(0) as u64)
}

/// Apply `changes` to a post and return the stored result.
///
/// An empty `image_url` removes the cover image.
pub fn update_post(conn: &Connection, id: PostId, changes: &PostChanges) -> Result<Post> {
    let current = get_post(conn, id)?.ok_or_else(|| Error::not_found("post", id))?;

    let title = changes.title.as_deref().unwrap_or(&current.title);
    let content = changes.content.as_deref().unwrap_or(&current.content);
    let image_url = match changes.image_url.as_deref() {
        Some("") => None,
        Some(url) => Some(url),
        None => current.image_url.as_deref(),
    };

    conn.execute(
        "UPDATE posts SET title = :title, content = :content, image_url = :image_url,
                          updated_at = :updated_at
         WHERE id = :id",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":title": title,
            ":content": content,
            ":image_url": image_url,
            ":updated_at": format_timestamp(Utc::now()),
        },
    )
    .map_err(db_err)?;

    get_post(conn, id)?.ok_or_else(|| Error::not_found("post", id))
}

/// Delete a post and its comments. Returns `false` if it did not exist.
pub fn delete_post(conn: &Connection, id: PostId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM posts WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(db_err)?;

    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::test_support;

    #[test]
    fn test_create_post_joins_author() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");

        let post = create_post(
            &conn,
            &NewPost {
                title: "Engines".into(),
                content: "Notes on the analytical engine".into(),
                image_url: Some("http://localhost/storage/blog-images/a.jpg".into()),
                author_id: author.id,
            },
        )
        .unwrap();

        assert_eq!(post.title, "Engines");
        assert_eq!(post.author_id, author.id);
        assert_eq!(post.user.email, "ada@example.com");
        assert_eq!(post.user.full_name.as_deref(), Some("Test User"));
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_create_post_unknown_author() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let err = create_post(
            &conn,
            &NewPost {
                title: "t".into(),
                content: "c".into(),
                image_url: None,
                author_id: UserId::new(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_get_post_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(get_post(&conn, PostId::new()).unwrap().is_none());
    }

    #[test]
    fn test_list_posts_newest_first() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");

        for i in 0..5 {
            test_support::post(&conn, &author, &format!("post {i}"));
        }

        let titles: Vec<String> = list_posts(&conn, None, 10, 0)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["post 4", "post 3", "post 2", "post 1", "post 0"]);
    }

    #[test]
    fn test_list_posts_paging() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");

        for i in 0..7 {
            test_support::post(&conn, &author, &format!("post {i}"));
        }

        let first = list_posts(&conn, None, 6, 0).unwrap();
        let second = list_posts(&conn, None, 6, 6).unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "post 0");
        assert_eq!(count_posts(&conn, None).unwrap(), 7);
    }

    #[test]
    fn test_list_posts_by_author() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let ada = test_support::user(&conn, "ada@example.com");
        let bob = test_support::user(&conn, "bob@example.com");

        test_support::post(&conn, &ada, "ada 1");
        test_support::post(&conn, &bob, "bob 1");
        test_support::post(&conn, &ada, "ada 2");

        let mine = list_posts(&conn, Some(ada.id), 10, 0).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.author_id == ada.id));
        assert_eq!(count_posts(&conn, Some(ada.id)).unwrap(), 2);
        assert_eq!(count_posts(&conn, Some(bob.id)).unwrap(), 1);
    }

    #[test]
    fn test_update_post_partial() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");
        let post = test_support::post(&conn, &author, "draft");

        let updated = update_post(
            &conn,
            post.id,
            &PostChanges {
                title: Some("final".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.title, "final");
        assert_eq!(updated.content, post.content);
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[test]
    fn test_update_post_image() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");
        let post = test_support::post(&conn, &author, "pic");

        let with_image = update_post(
            &conn,
            post.id,
            &PostChanges {
                image_url: Some("http://x/storage/blog-images/a.jpg".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(with_image.image_url.is_some());

        let kept = update_post(&conn, post.id, &PostChanges::default()).unwrap();
        assert_eq!(kept.image_url, with_image.image_url);

        let cleared = update_post(
            &conn,
            post.id,
            &PostChanges {
                image_url: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(cleared.image_url.is_none());
    }

    #[test]
    fn test_update_missing_post() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let err = update_post(&conn, PostId::new(), &PostChanges::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_delete_post() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");
        let post = test_support::post(&conn, &author, "bye");

        assert!(delete_post(&conn, post.id).unwrap());
        assert!(!delete_post(&conn, post.id).unwrap());
        assert!(get_post(&conn, post.id).unwrap().is_none());
    }

    #[test]
    fn test_posts_removed_with_author() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let author = test_support::user(&conn, "ada@example.com");
        test_support::post(&conn, &author, "one");

        crate::queries::users::delete_user(&conn, author.id).unwrap();
        assert_eq!(count_posts(&conn, None).unwrap(), 0);
    }
}
