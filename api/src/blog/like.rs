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
    notification::emit::notify_like,
    store::{Store, StoreError},
};

#[derive(thiserror::Error, Debug)]
pub enum LikeError {
    #[error("Post not found")]
    PostNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiRequestError for LikeError {
    fn status_code(&self) -> StatusCode {
        match self {
            LikeError::PostNotFound => StatusCode::NOT_FOUND,
            LikeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}

#[debug_handler(state = App)]
pub async fn like_post(
    State(ctx): State<App>,
    Path(post_id): Path<Uuid>,
    AuthUser(session): AuthUser,
) -> Result<Json<LikeState>, AppError> {
    let state = toggle_like(&*ctx.store, &session, post_id).await?;

    Ok(Json(state))
}

/// Likes the post, or takes the like back if the session already liked it.
pub async fn toggle_like<S>(store: &S, session: &Session, post_id: Uuid) -> Result<LikeState, LikeError>
where
    S: Store + ?Sized,
{
    let post = store.post(post_id).await?.ok_or(LikeError::PostNotFound)?;
    let user_id = session.user_id();

    let liked = if store.has_liked(post.id, user_id).await? {
        store.delete_like(post.id, user_id).await?;
        false
    } else {
        // A concurrent toggle may have won the insert; only the writer notifies
        if store.insert_like(post.id, user_id).await? == 1 {
            notify_like(store, &post, &session.profile).await;
        }
        true
    };

    let likes = store.like_count(post.id).await?;

    Ok(LikeState { liked, likes })
}
