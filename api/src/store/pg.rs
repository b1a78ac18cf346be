use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{
    AsyncPgConnection, RunQueryDsl,
    pooled_connection::{AsyncDieselConnectionManager, deadpool::Pool},
};
use uuid::Uuid;

use super::{
    CommentStore, LikeStore, NotificationStore, PostStore, ProfileStore, SessionStore, StoreError,
};
use crate::{
    blog::models::{
        comment::{Comment, NewComment},
        like::NewLike,
        post::Post,
    },
    identity::models::profile::Profile,
    notification::models::{NewNotification, NewNotificationRow, Notification, NotificationRow},
    schema::{comments, likes, notifications, posts, profiles, sessions},
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub fn connect(
        database_url: &str,
        max_size: usize,
        acquire_timeout: Duration,
    ) -> Result<Self, eyre::Error> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(max_size)
            .wait_timeout(Some(acquire_timeout))
            .runtime(deadpool_runtime::Runtime::Tokio1)
            .build()?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows = comments::table
            .filter(comments::post_id.eq(post_id))
            .order(comments::created_at.asc())
            .select(Comment::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = comments::table
            .find(id)
            .select(Comment::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = diesel::insert_into(comments::table)
            .values(&comment)
            .returning(Comment::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(row)
    }

    async fn update_comment_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = diesel::update(comments::table.find(id))
            .set(comments::content.eq(content))
            .returning(Comment::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        Ok(row)
    }

    async fn reply_ids(&self, parent_ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let mut conn = self.pool.get().await?;

        let ids = comments::table
            .filter(comments::parent_id.assume_not_null().eq_any(parent_ids))
            .select(comments::id)
            .load::<Uuid>(&mut conn)
            .await?;

        Ok(ids)
    }

    async fn delete_comments(&self, ids: &[Uuid]) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(comments::table.filter(comments::id.eq_any(ids)))
            .execute(&mut conn)
            .await?;

        Ok(deleted)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get().await?;

        let rows = profiles::table
            .filter(profiles::id.eq_any(ids))
            .select(Profile::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = posts::table
            .find(id)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row)
    }
}

#[async_trait]
impl LikeStore for PgStore {
    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;

        let liked = diesel::select(diesel::dsl::exists(
            likes::table
                .filter(likes::post_id.eq(post_id))
                .filter(likes::user_id.eq(user_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await?;

        Ok(liked)
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        // (post_id, user_id) is unique, a double submit is a no-op
        let inserted = diesel::insert_into(likes::table)
            .values(&NewLike { post_id, user_id })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(inserted)
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(
            likes::table
                .filter(likes::post_id.eq(post_id))
                .filter(likes::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(deleted)
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64, StoreError> {
        let mut conn = self.pool.get().await?;

        let count = likes::table
            .filter(likes::post_id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = diesel::insert_into(notifications::table)
            .values(NewNotificationRow::from(notification))
            .returning(NotificationRow::as_returning())
            .get_result::<NotificationRow>(&mut conn)
            .await?;

        Notification::try_from(row).map_err(StoreError::Malformed)
    }

    async fn notifications_for(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .limit(limit)
            .select(NotificationRow::as_select())
            .load::<NotificationRow>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Notification::try_from(row) {
                    Ok(n) => Some(n),
                    Err(err) => {
                        tracing::warn!(%id, %err, "Skipping malformed notification row");
                        None
                    }
                }
            })
            .collect())
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let mut conn = self.pool.get().await?;

        let count = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(count)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await?;

        Ok(updated)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await?;

        Ok(updated)
    }

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(
            notifications::table
                .filter(notifications::id.eq(id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(deleted)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn session_profile(&self, token: &str) -> Result<Option<Profile>, StoreError> {
        let mut conn = self.pool.get().await?;

        let profile = sessions::table
            .inner_join(profiles::table)
            .filter(sessions::token.eq(token))
            .filter(sessions::active.eq(true))
            .filter(sessions::expires_at.gt(diesel::dsl::now))
            .select(Profile::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(profile)
    }

    async fn end_session(&self, token: &str) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(sessions::table.filter(sessions::token.eq(token)))
            .set(sessions::active.eq(false))
            .execute(&mut conn)
            .await?;

        Ok(updated)
    }
}
