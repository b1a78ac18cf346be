//! In-process store used by the unit tests. Mirrors the Postgres semantics the
//! operations rely on and can be told to fail specific calls.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{
    CommentStore, LikeStore, NotificationStore, PostStore, ProfileStore, SessionStore, StoreError,
};
use crate::{
    App,
    blog::models::{
        comment::{Comment, NewComment},
        post::Post,
    },
    config::{Env, ServerConfig},
    identity::models::profile::Profile,
    notification::models::{NewNotification, Notification},
};

/// Application state backed by `store`, for driving extractors and handlers.
pub fn app(store: Arc<MemoryStore>) -> App {
    App {
        store,
        config: Arc::new(ServerConfig {
            env: Env::Dev,
            database_url: String::new(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_pool_size: 1,
            database_acquire_timeout: Duration::from_secs(1),
            cors_allowed_origins: vec![],
            notification_poll_interval: Duration::from_secs(30),
        }),
    }
}

#[derive(Default)]
struct Tables {
    comments: Vec<Comment>,
    profiles: Vec<Profile>,
    posts: Vec<Post>,
    likes: Vec<(Uuid, Uuid)>,
    notifications: Vec<Notification>,
    sessions: HashMap<String, (Uuid, bool)>,
    clock: i64,
    // `has_liked` answers false, as if a concurrent like landed after the read
    stale_like_reads: bool,
    // op name -> successful calls left before the op starts failing
    fail_after: HashMap<&'static str, usize>,
}

impl Tables {
    fn tick(&mut self) -> NaiveDateTime {
        self.clock += 1;
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::try_seconds(self.clock).unwrap()
    }

    fn check(&mut self, op: &'static str) -> Result<(), StoreError> {
        match self.fail_after.get_mut(op) {
            Some(0) => Err(StoreError::Injected(op)),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Makes `op` fail once it has succeeded `after` times.
    pub fn fail_on(&self, op: &'static str, after: usize) {
        self.lock().fail_after.insert(op, after);
    }

    pub fn add_profile(&self, username: &str, full_name: Option<&str>) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            username: username.into(),
            full_name: full_name.map(Into::into),
            avatar_url: None,
        };
        self.lock().profiles.push(profile.clone());
        profile
    }

    pub fn add_post(&self, author_id: Uuid, title: &str, published: bool) -> Post {
        let mut tables = self.lock();
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            title: title.into(),
            published,
            created_at: tables.tick(),
        };
        tables.posts.push(post.clone());
        post
    }

    pub fn add_comment(&self, post_id: Uuid, parent_id: Option<Uuid>, author_id: Uuid) -> Comment {
        let mut tables = self.lock();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            parent_id,
            author_id,
            content: "hello".into(),
            created_at: tables.tick(),
        };
        tables.comments.push(comment.clone());
        comment
    }

    pub fn add_like(&self, post_id: Uuid, user_id: Uuid) {
        self.lock().likes.push((post_id, user_id));
    }

    pub fn stale_like_reads(&self) {
        self.lock().stale_like_reads = true;
    }

    pub fn add_session(&self, token: &str, profile_id: Uuid, active: bool) {
        self.lock()
            .sessions
            .insert(token.into(), (profile_id, active));
    }

    pub fn comment_ids(&self) -> Vec<Uuid> {
        self.lock().comments.iter().map(|c| c.id).collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let mut tables = self.lock();
        tables.check("comments_for_post")?;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.lock();
        tables.check("comment")?;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let mut tables = self.lock();
        tables.check("insert_comment")?;
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: tables.tick(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.lock();
        tables.check("update_comment_content")?;
        Ok(tables.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.content = content.into();
            c.clone()
        }))
    }

    async fn reply_ids(&self, parent_ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let mut tables = self.lock();
        tables.check("reply_ids")?;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.parent_id.is_some_and(|p| parent_ids.contains(&p)))
            .map(|c| c.id)
            .collect())
    }

    async fn delete_comments(&self, ids: &[Uuid]) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("delete_comments")?;
        let before = tables.comments.len();
        tables.comments.retain(|c| !ids.contains(&c.id));
        Ok(before - tables.comments.len())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
        let mut tables = self.lock();
        tables.check("profiles")?;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut tables = self.lock();
        tables.check("post")?;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        tables.check("has_liked")?;
        if tables.stale_like_reads {
            return Ok(false);
        }
        Ok(tables.likes.contains(&(post_id, user_id)))
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("insert_like")?;
        if tables.likes.contains(&(post_id, user_id)) {
            return Ok(0);
        }
        tables.likes.push((post_id, user_id));
        Ok(1)
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("delete_like")?;
        let before = tables.likes.len();
        tables.likes.retain(|l| *l != (post_id, user_id));
        Ok(before - tables.likes.len())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64, StoreError> {
        let mut tables = self.lock();
        tables.check("like_count")?;
        Ok(tables.likes.iter().filter(|(p, _)| *p == post_id).count() as i64)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, StoreError> {
        let mut tables = self.lock();
        tables.check("insert_notification")?;
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            message: notification.message.clone(),
            post_id: notification.post_id,
            from_user_id: notification.from_user_id,
            read: false,
            created_at: tables.tick(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications_for(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut tables = self.lock();
        tables.check("notifications_for")?;
        let mut rows: Vec<_> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let mut tables = self.lock();
        tables.check("unread_count")?;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("mark_read")?;
        let mut matched = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.id == id && n.user_id == user_id)
        {
            n.read = true;
            matched += 1;
        }
        Ok(matched)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("mark_all_read")?;
        let mut matched = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("delete_notification")?;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(before - tables.notifications.len())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn session_profile(&self, token: &str) -> Result<Option<Profile>, StoreError> {
        let mut tables = self.lock();
        tables.check("session_profile")?;
        let profile_id = match tables.sessions.get(token) {
            Some((id, true)) => *id,
            _ => return Ok(None),
        };
        Ok(tables.profiles.iter().find(|p| p.id == profile_id).cloned())
    }

    async fn end_session(&self, token: &str) -> Result<usize, StoreError> {
        let mut tables = self.lock();
        tables.check("end_session")?;
        Ok(match tables.sessions.get_mut(token) {
            Some(session) => {
                session.1 = false;
                1
            }
            None => 0,
        })
    }
}
