use std::collections::HashSet;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    App,
    error::{ApiRequestError, AppError},
    identity::{AuthUser, Session},
    store::{CommentStore, StoreError},
};

#[derive(thiserror::Error, Debug)]
pub enum ModerationError {
    #[error("Comment not found")]
    NotFound,

    #[error("You are not the owner of this comment")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiRequestError for ModerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ModerationError::NotFound => StatusCode::NOT_FOUND,
            ModerationError::Forbidden => StatusCode::FORBIDDEN,
            ModerationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every comment removed by a delete, the requested one first.
#[derive(Serialize, Debug)]
pub struct DeletedComments {
    pub ids: Vec<Uuid>,
}

#[debug_handler(state = App)]
pub async fn remove_comment(
    State(ctx): State<App>,
    Path((_post_id, id)): Path<(Uuid, Uuid)>,
    AuthUser(session): AuthUser,
) -> Result<Json<DeletedComments>, AppError> {
    let deleted = delete_comment(&*ctx.store, id, &session).await?;

    Ok(Json(deleted))
}

/// Deletes a comment owned by the session together with every reply nested
/// under it.
///
/// Replies go first, in one statement, so a failure there leaves the comment
/// itself in place. If the final delete fails the replies are already gone;
/// nothing is retried.
pub async fn delete_comment<S>(
    store: &S,
    comment_id: Uuid,
    session: &Session,
) -> Result<DeletedComments, ModerationError>
where
    S: CommentStore + ?Sized,
{
    let comment = store
        .comment(comment_id)
        .await?
        .ok_or(ModerationError::NotFound)?;

    if comment.author_id != session.user_id() {
        return Err(ModerationError::Forbidden);
    }

    let descendants = collect_descendants(store, comment_id).await?;

    if !descendants.is_empty() {
        store.delete_comments(&descendants).await?;
    }

    // Someone else deleted it between the read and here
    if store.delete_comments(&[comment_id]).await? == 0 {
        return Err(ModerationError::NotFound);
    }

    tracing::info!(
        %comment_id,
        user_id = %session.user_id(),
        replies = descendants.len(),
        "Comment deleted"
    );

    let mut ids = Vec::with_capacity(descendants.len() + 1);
    ids.push(comment_id);
    ids.extend(descendants);

    Ok(DeletedComments { ids })
}

/// Walks the reply tree one level per query.
async fn collect_descendants<S>(store: &S, root: Uuid) -> Result<Vec<Uuid>, StoreError>
where
    S: CommentStore + ?Sized,
{
    let mut seen = HashSet::from([root]);
    let mut descendants = Vec::new();
    let mut level = vec![root];

    while !level.is_empty() {
        level = store
            .reply_ids(&level)
            .await?
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        descendants.extend_from_slice(&level);
    }

    Ok(descendants)
}
