//! Blogforge-Common: Shared types, IDs, and error handling.
//!
//! This crate provides functionality used across every blogforge crate:
//!
//! - **Typed IDs**: Type-safe UUID wrappers for users, posts and comments
//! - **Core Types**: Upload folders and feed view filters
//! - **Error Handling**: The unified error type and its HTTP status mapping
//!
//! # Examples
//!
//! ```
//! use blogforge_common::{Error, PostId, Result, UploadFolder};
//!
//! let post_id = PostId::new();
//! assert_eq!(UploadFolder::Avatars.as_str(), "avatars");
//!
//! fn lookup(id: PostId) -> Result<()> {
//!     Err(Error::not_found("post", id))
//! }
//! assert!(lookup(post_id).is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
