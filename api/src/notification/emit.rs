//! Notification fan-out for likes, comments and replies.
//!
//! Emission is best-effort: it runs after the action it reports on has been
//! stored, and a failure here is logged and dropped so it can never fail or
//! undo that action.

use uuid::Uuid;

use super::models::{NewNotification, NotificationType};
use crate::{
    blog::models::post::Post, identity::models::profile::Profile, store::NotificationStore,
};

pub fn like_message(name: &str, title: &str) -> String {
    format!("{name} liked your post \"{title}\"")
}

pub fn comment_message(name: &str, title: &str) -> String {
    format!("{name} commented on your post \"{title}\"")
}

pub fn reply_message(name: &str, title: &str) -> String {
    format!("{name} replied to your comment on \"{title}\"")
}

/// Writes a notification for `recipient`, unless the recipient is the one who
/// caused it.
pub async fn notify<S>(
    store: &S,
    kind: NotificationType,
    recipient: Uuid,
    originator: Uuid,
    message: String,
    post_id: Option<Uuid>,
) where
    S: NotificationStore + ?Sized,
{
    if recipient == originator {
        tracing::trace!(%recipient, kind = kind.as_str(), "Skipping self-notification");
        return;
    }

    let notification = NewNotification {
        user_id: recipient,
        kind,
        message,
        post_id,
        from_user_id: Some(originator),
    };

    if let Err(err) = store.insert_notification(&notification).await {
        tracing::warn!(
            ?err,
            %recipient,
            kind = kind.as_str(),
            "Failed to create notification"
        );
    }
}

pub async fn notify_like<S>(store: &S, post: &Post, liker: &Profile)
where
    S: NotificationStore + ?Sized,
{
    notify(
        store,
        NotificationType::Like,
        post.author_id,
        liker.id,
        like_message(liker.display_name(), &post.title),
        Some(post.id),
    )
    .await
}

pub async fn notify_comment<S>(store: &S, post: &Post, commenter: &Profile)
where
    S: NotificationStore + ?Sized,
{
    notify(
        store,
        NotificationType::Comment,
        post.author_id,
        commenter.id,
        comment_message(commenter.display_name(), &post.title),
        Some(post.id),
    )
    .await
}

pub async fn notify_reply<S>(store: &S, parent_author: Uuid, post: &Post, replier: &Profile)
where
    S: NotificationStore + ?Sized,
{
    notify(
        store,
        NotificationType::Reply,
        parent_author,
        replier.id,
        reply_message(replier.display_name(), &post.title),
        Some(post.id),
    )
    .await
}
