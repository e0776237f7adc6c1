//! Rust models matching the database schema.

use blogforge_common::{CommentId, PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The fields other users are allowed to see.
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Author information joined onto posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Blog post joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: PublicProfile,
}

/// Fields required to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: UserId,
}

/// Partial update of a post. `None` leaves the column unchanged.
///
/// An empty `image_url` clears the cover image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// Comment joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: PublicProfile,
}

/// Login session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthToken {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Whether the token is still usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
