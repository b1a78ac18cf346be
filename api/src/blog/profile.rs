use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    blog::{comment::CommentTree, models::comment::Comment},
    identity::models::profile::Profile,
    store::{ProfileStore, StoreError},
};

/// Fetches the display profiles for a set of authors in one round-trip.
pub async fn resolve_profiles<S>(
    store: &S,
    author_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, Profile>, StoreError>
where
    S: ProfileStore + ?Sized,
{
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = author_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = store.profiles(&ids).await?;

    Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
}

/// Pairs each comment with its author's profile. Authors without a profile
/// row get a placeholder so one missing profile can't break the whole thread.
pub fn decorate(
    comments: Vec<Comment>,
    profiles: &HashMap<Uuid, Profile>,
    viewer: Option<Uuid>,
) -> Vec<CommentTree> {
    comments
        .into_iter()
        .map(|comment| {
            let author = match profiles.get(&comment.author_id) {
                Some(profile) => profile.clone(),
                None => {
                    tracing::warn!(
                        comment_id = %comment.id,
                        author_id = %comment.author_id,
                        "No profile found for comment author"
                    );
                    Profile::placeholder(comment.author_id)
                }
            };
            CommentTree::new(comment, author, viewer)
        })
        .collect()
}
