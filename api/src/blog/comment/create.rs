use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    App,
    blog::models::comment::NewComment,
    error::AppError,
    identity::{AuthUser, Session},
    notification::emit::{notify_comment, notify_reply},
    store::Store,
};

use super::{CommentError, CommentTree, validate_content};

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentSubmission {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[debug_handler(state = App)]
pub async fn post_comment(
    State(ctx): State<App>,
    Path(post_id): Path<Uuid>,
    AuthUser(session): AuthUser,
    crate::json::Json(submission): crate::json::Json<CommentSubmission>,
) -> Result<(StatusCode, Json<CommentTree>), AppError> {
    let comment = create_comment(&*ctx.store, &session, post_id, submission).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Stores a new comment and notifies whoever it is addressed to. The returned
/// comment is decorated and ready to be patched into the client's tree.
pub async fn create_comment<S>(
    store: &S,
    session: &Session,
    post_id: Uuid,
    submission: CommentSubmission,
) -> Result<CommentTree, CommentError>
where
    S: Store + ?Sized,
{
    let content = validate_content(&submission.content)?;

    let post = store
        .post(post_id)
        .await?
        .ok_or(CommentError::PostNotFound)?;

    if !post.published {
        return Err(CommentError::PostNotPublished);
    }

    // check if the parent comment actually belongs to the post
    let parent = match submission.parent_id {
        Some(parent_id) => match store.comment(parent_id).await? {
            Some(parent) if parent.post_id == post.id => Some(parent),
            _ => return Err(CommentError::ParentNotOnPost),
        },
        None => None,
    };

    let comment = store
        .insert_comment(NewComment {
            post_id: post.id,
            parent_id: parent.as_ref().map(|p| p.id),
            author_id: session.user_id(),
            content,
        })
        .await?;

    tracing::debug!(
        comment_id = %comment.id,
        post_id = %post.id,
        is_reply = parent.is_some(),
        "Comment created"
    );

    match &parent {
        Some(parent) => notify_reply(store, parent.author_id, &post, &session.profile).await,
        None => notify_comment(store, &post, &session.profile).await,
    }

    Ok(CommentTree::new(
        comment,
        session.profile.clone(),
        Some(session.user_id()),
    ))
}
