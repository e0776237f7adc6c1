//! Post feed state: the loaded page of posts, the post being viewed, and the
//! pagination/filter state that drives which page is fetched next.
//!
//! [`FeedState`] is a plain reducer-style state machine. Each method applies
//! one transition in place. It is the client-side model of the feed: a
//! `GET /api/posts` response (`FeedPage`) folds into it through
//! [`FeedState::set_blogs`] with `pagination.total_count`. The server uses [`Pagination`] on its own to turn
//! a requested page into `LIMIT`/`OFFSET` and to describe paged responses.

use blogforge_common::{CommentId, PostId, ViewFilter};
use blogforge_db::models::{Comment, Post};
use serde::Serialize;

/// Posts per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Page bookkeeping for the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Empty pagination on page 1. A zero page size is treated as 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    /// Pagination for `page` of a result set holding `total_count` rows.
    ///
    /// Pages below 1 are treated as 1.
    pub fn for_page(page: u32, page_size: u32, total_count: u64) -> Self {
        let mut pagination = Self::new(page_size);
        pagination.current_page = page.max(1);
        pagination.set_total_count(total_count);
        pagination
    }

    /// Number of rows to fetch.
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip before the current page.
    pub fn offset(&self) -> u32 {
        self.current_page
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }

    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
        self.recompute_pages();
    }

    fn recompute_pages(&mut self) {
        let pages = self.total_count.div_ceil(u64::from(self.page_size.max(1)));
        self.total_pages = u32::try_from(pages).unwrap_or(u32::MAX);
    }
}

/// Client-side view of the feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedState {
    pub blogs: Vec<Post>,
    pub current_blog: Option<Post>,
    /// Comments of `current_blog`, oldest first.
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
    pub view_filter: ViewFilter,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Self::default()
        }
    }

    /// A freshly created post goes to the top of the list.
    pub fn add_blog(&mut self, post: Post) {
        self.blogs.insert(0, post);
        let total = self.pagination.total_count.saturating_add(1);
        self.pagination.set_total_count(total);
    }

    pub fn update_blog(&mut self, post: Post) {
        if let Some(existing) = self.blogs.iter_mut().find(|b| b.id == post.id) {
            *existing = post.clone();
        }
        if self.current_blog.as_ref().is_some_and(|b| b.id == post.id) {
            self.current_blog = Some(post);
        }
    }

    pub fn delete_blog(&mut self, id: PostId) {
        self.blogs.retain(|b| b.id != id);
        let total = self.pagination.total_count.saturating_sub(1);
        self.pagination.set_total_count(total);
        if self.current_blog.as_ref().is_some_and(|b| b.id == id) {
            self.current_blog = None;
            self.comments.clear();
        }
    }

    /// Replace the loaded page with a fresh result from the server.
    pub fn set_blogs(&mut self, blogs: Vec<Post>, total_count: u64) {
        self.blogs = blogs;
        self.pagination.set_total_count(total_count);
        self.loading = false;
    }

    pub fn set_current_blog(&mut self, post: Option<Post>) {
        let changed = match (&self.current_blog, &post) {
            (Some(a), Some(b)) => a.id != b.id,
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.comments.clear();
        }
        self.current_blog = post;
        self.loading = false;
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.pagination.current_page = page;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
        self.loading = false;
    }

    /// Switching filters always returns to the first page.
    pub fn set_view_filter(&mut self, filter: ViewFilter) {
        self.view_filter = filter;
        self.pagination.current_page = 1;
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }

    /// Append a comment if it belongs to the post being viewed.
    pub fn add_comment(&mut self, comment: Comment) {
        if self
            .current_blog
            .as_ref()
            .is_some_and(|b| b.id == comment.post_id)
        {
            self.comments.push(comment);
        }
    }

    pub fn delete_comment(&mut self, id: CommentId) {
        self.comments.retain(|c| c.id != id);
    }
}
