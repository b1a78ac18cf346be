pub mod create;
pub mod delete;
pub mod get;
pub mod patch;
pub mod tree;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    blog::models::comment::Comment, error::ApiRequestError, identity::models::profile::Profile,
    store::StoreError,
};

pub const MAX_CONTENT_CHARS: usize = 5000;

// The model that will be returned to the client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentTree {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author: Profile,
    pub content: String,
    pub created_at: chrono::NaiveDateTime,
    pub depth: usize,
    pub is_comment_owner: bool,
    pub replies: Vec<CommentTree>,
}

impl CommentTree {
    pub fn new(comment: Comment, author: Profile, viewer: Option<Uuid>) -> Self {
        CommentTree {
            is_comment_owner: viewer == Some(comment.author_id),
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author,
            content: comment.content,
            created_at: comment.created_at,
            depth: 0,
            replies: vec![],
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CommentError {
    #[error("No content provided")]
    EmptyContent,

    #[error("Content too long (max {MAX_CONTENT_CHARS} characters)")]
    ContentTooLong,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comments can only be added to published posts")]
    PostNotPublished,

    #[error("You're replying to a comment that does not belong to this post")]
    ParentNotOnPost,

    #[error("Comment not found")]
    NotFound,

    #[error("You are not the owner of this comment")]
    NotOwner,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiRequestError for CommentError {
    fn status_code(&self) -> StatusCode {
        match self {
            CommentError::EmptyContent
            | CommentError::ContentTooLong
            | CommentError::ParentNotOnPost => StatusCode::BAD_REQUEST,
            CommentError::PostNotFound | CommentError::NotFound => StatusCode::NOT_FOUND,
            CommentError::PostNotPublished | CommentError::NotOwner => StatusCode::FORBIDDEN,
            CommentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Trims the content and checks it is non-empty and within the length limit.
pub fn validate_content(content: &str) -> Result<String, CommentError> {
    let content = content.trim();

    if content.is_empty() {
        return Err(CommentError::EmptyContent);
    }

    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(CommentError::ContentTooLong);
    }

    Ok(content.to_string())
}
