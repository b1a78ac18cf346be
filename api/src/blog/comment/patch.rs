use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    App,
    error::AppError,
    identity::{AuthUser, Session},
    store::CommentStore,
};

use super::{CommentError, CommentTree, validate_content};

#[derive(Deserialize)]
pub struct CommentPatch {
    content: String,
}

#[debug_handler(state = App)]
pub async fn patch_comment(
    State(ctx): State<App>,
    Path((post_id, id)): Path<(Uuid, Uuid)>,
    AuthUser(session): AuthUser,
    crate::json::Json(patch): crate::json::Json<CommentPatch>,
) -> Result<Json<CommentTree>, AppError> {
    let comment = edit_comment(&*ctx.store, &session, post_id, id, &patch.content).await?;

    Ok(Json(comment))
}

/// Replaces the content of a comment the session owns.
pub async fn edit_comment<S>(
    store: &S,
    session: &Session,
    post_id: Uuid,
    id: Uuid,
    content: &str,
) -> Result<CommentTree, CommentError>
where
    S: CommentStore + ?Sized,
{
    let content = validate_content(content)?;

    let existing = store
        .comment(id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or(CommentError::NotFound)?;

    if existing.author_id != session.user_id() {
        return Err(CommentError::NotOwner);
    }

    // The row may have been deleted since it was read
    let updated = store
        .update_comment_content(id, &content)
        .await?
        .ok_or(CommentError::NotFound)?;

    Ok(CommentTree::new(
        updated,
        session.profile.clone(),
        Some(session.user_id()),
    ))
}
