use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    App,
    blog::profile::{decorate, resolve_profiles},
    error::AppError,
    identity::MaybeAuthUser,
    store::Store,
};

use super::{CommentError, CommentTree, tree::build_tree};

#[derive(Deserialize)]
pub struct Queries {
    sort: Option<SortType>,
}

#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub enum SortType {
    #[default]
    New,
    Old,
}

impl<'de> Deserialize<'de> for SortType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match String::deserialize(deserializer)?.as_str() {
            "new" => Ok(SortType::New),
            "old" => Ok(SortType::Old),
            _ => Err(serde::de::Error::custom("invalid sort type")),
        }
    }
}

pub async fn get_comments(
    State(ctx): State<App>,
    Path(post_id): Path<Uuid>,
    q: Query<Queries>,
    MaybeAuthUser(session): MaybeAuthUser,
) -> Result<Json<Vec<CommentTree>>, AppError> {
    let viewer = session.as_ref().ok().map(|s| s.user_id());
    let sort = q.sort.unwrap_or_default();

    let tree = list_comments(&*ctx.store, viewer, post_id, sort).await?;

    Ok(Json(tree))
}

/// Fetches a post's comments and returns them nested, sorted at every level.
pub async fn list_comments<S>(
    store: &S,
    viewer: Option<Uuid>,
    post_id: Uuid,
    sort: SortType,
) -> Result<Vec<CommentTree>, CommentError>
where
    S: Store + ?Sized,
{
    let mut comments = store.comments_for_post(post_id).await?;

    // The tree keeps input order, so sorting here orders every level
    match sort {
        SortType::New => comments.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortType::Old => comments.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    let profiles = resolve_profiles(store, comments.iter().map(|c| c.author_id)).await?;

    Ok(build_tree(decorate(comments, &profiles, viewer)))
}
