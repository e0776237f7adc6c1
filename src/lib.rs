//! Blogforge - a small blog server
//!
//! This library crate exposes the application modules for the binary and
//! for integration testing.

pub mod config;
pub mod feed;
pub mod images;
pub mod server;
