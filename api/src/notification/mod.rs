use axum::http::StatusCode;
use uuid::Uuid;

use crate::{
    error::ApiRequestError,
    identity::Session,
    store::{NotificationStore, StoreError},
};

use self::models::Notification;

pub mod emit;
pub mod models;
pub mod routes;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(thiserror::Error, Debug)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiRequestError for NotificationError {
    fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::NotFound => StatusCode::NOT_FOUND,
            NotificationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub async fn list_notifications<S>(
    store: &S,
    session: &Session,
    limit: Option<i64>,
) -> Result<Vec<Notification>, NotificationError>
where
    S: NotificationStore + ?Sized,
{
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    Ok(store.notifications_for(session.user_id(), limit).await?)
}

pub async fn unread_count<S>(store: &S, session: &Session) -> Result<i64, NotificationError>
where
    S: NotificationStore + ?Sized,
{
    Ok(store.unread_count(session.user_id()).await?)
}

/// Idempotent. Ids that don't exist or belong to someone else count as
/// already read.
pub async fn mark_as_read<S>(store: &S, session: &Session, id: Uuid) -> Result<(), NotificationError>
where
    S: NotificationStore + ?Sized,
{
    let matched = store.mark_read(id, session.user_id()).await?;

    if matched == 0 {
        tracing::debug!(%id, user_id = %session.user_id(), "Nothing to mark as read");
    }

    Ok(())
}

pub async fn mark_all_as_read<S>(store: &S, session: &Session) -> Result<usize, NotificationError>
where
    S: NotificationStore + ?Sized,
{
    Ok(store.mark_all_read(session.user_id()).await?)
}

pub async fn delete_notification<S>(
    store: &S,
    session: &Session,
    id: Uuid,
) -> Result<(), NotificationError>
where
    S: NotificationStore + ?Sized,
{
    match store.delete_notification(id, session.user_id()).await? {
        0 => Err(NotificationError::NotFound),
        _ => Ok(()),
    }
}
