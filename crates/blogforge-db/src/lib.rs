//! Blogforge-DB: Database schema, migrations, and query operations
//!
//! This crate stores users, posts, comments and session tokens in SQLite
//! using rusqlite with r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use blogforge_db::pool::{init_pool, get_conn};
//! use blogforge_db::queries::users;
//!
//! let pool = init_pool("/var/lib/blogforge/blogforge.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let user = users::create_user(&conn, "ada@example.com", "hash", Some("Ada")).unwrap();
//! println!("Created user: {}", user.email);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
