use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{App, error::AppError, identity::AuthUser};

use super::models::Notification;

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(get_unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", post(mark_read))
        .route("/{id}", delete(delete_notification))
}

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<i64>,
}

async fn get_notifications(
    State(ctx): State<App>,
    AuthUser(session): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = super::list_notifications(&*ctx.store, &session, q.limit).await?;
    Ok(Json(notifications))
}

#[derive(Serialize)]
pub struct UnreadCount {
    count: i64,
    /// Clients polling for new notifications should wait this long between
    /// requests
    poll_interval_secs: u64,
}

async fn get_unread_count(
    State(ctx): State<App>,
    AuthUser(session): AuthUser,
) -> Result<Json<UnreadCount>, AppError> {
    let count = super::unread_count(&*ctx.store, &session).await?;
    Ok(Json(UnreadCount {
        count,
        poll_interval_secs: ctx.config.notification_poll_interval.as_secs(),
    }))
}

async fn mark_read(
    State(ctx): State<App>,
    AuthUser(session): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    super::mark_as_read(&*ctx.store, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct MarkedAll {
    updated: usize,
}

async fn mark_all_read(
    State(ctx): State<App>,
    AuthUser(session): AuthUser,
) -> Result<Json<MarkedAll>, AppError> {
    let updated = super::mark_all_as_read(&*ctx.store, &session).await?;
    Ok(Json(MarkedAll { updated }))
}

async fn delete_notification(
    State(ctx): State<App>,
    AuthUser(session): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    super::delete_notification(&*ctx.store, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
