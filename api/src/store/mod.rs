//! Typed access to the hosted Postgres database.
//!
//! Every table the API touches is reached through one of the traits below,
//! so rows are mapped into typed models here and nowhere else. Handlers hold
//! an `Arc<dyn Store>`; the operations they call are generic over the single
//! trait they need, which keeps them testable against [`memory::MemoryStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    blog::models::{
        comment::{Comment, NewComment},
        post::Post,
    },
    identity::models::profile::Profile,
    notification::models::{NewNotification, Notification},
};

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("could not get a database connection: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error("malformed row: {0}")]
    Malformed(String),

    #[cfg(test)]
    #[error("injected failure: {0}")]
    Injected(&'static str),
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    async fn comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;

    /// Returns `None` when no comment has the given id.
    async fn update_comment_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, StoreError>;

    /// Ids of the comments whose `parent_id` is one of `parent_ids`.
    async fn reply_ids(&self, parent_ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError>;

    /// Returns the number of rows deleted.
    async fn delete_comments(&self, ids: &[Uuid]) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profiles for the given ids. Unknown ids are simply absent.
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>, StoreError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
}

#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Returns the number of rows written, 0 when the like already existed.
    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize, StoreError>;

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize, StoreError>;

    async fn like_count(&self, post_id: Uuid) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, StoreError>;

    /// Newest first.
    async fn notifications_for(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError>;

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, StoreError>;

    /// Flips `read` on a notification owned by `user_id`. Returns the number
    /// of rows matched.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<usize, StoreError>;

    async fn mark_all_read(&self, user_id: Uuid) -> Result<usize, StoreError>;

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The profile behind an active, unexpired session token.
    async fn session_profile(&self, token: &str) -> Result<Option<Profile>, StoreError>;

    async fn end_session(&self, token: &str) -> Result<usize, StoreError>;
}

pub trait Store:
    CommentStore + ProfileStore + PostStore + LikeStore + NotificationStore + SessionStore
{
}

impl<T> Store for T where
    T: CommentStore + ProfileStore + PostStore + LikeStore + NotificationStore + SessionStore
{
}
