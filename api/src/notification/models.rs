use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Like,
    Comment,
    Reply,
    Follow,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Like => "like",
            NotificationType::Comment => "comment",
            NotificationType::Reply => "reply",
            NotificationType::Follow => "follow",
        }
    }
}

impl TryFrom<&str> for NotificationType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "like" => Ok(NotificationType::Like),
            "comment" => Ok(NotificationType::Comment),
            "reply" => Ok(NotificationType::Reply),
            "follow" => Ok(NotificationType::Follow),
            other => Err(format!("unknown notification type `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub post_id: Option<Uuid>,
    pub from_user_id: Option<Uuid>,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

// The row as stored, before `kind` is checked against the known types
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub post_id: Option<Uuid>,
    pub from_user_id: Option<Uuid>,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = String;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind: NotificationType::try_from(row.kind.as_str())?,
            message: row.message,
            post_id: row.post_id,
            from_user_id: row.from_user_id,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationType,
    pub message: String,
    pub post_id: Option<Uuid>,
    pub from_user_id: Option<Uuid>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotificationRow<'a> {
    pub user_id: Uuid,
    pub kind: &'a str,
    pub message: &'a str,
    pub post_id: Option<Uuid>,
    pub from_user_id: Option<Uuid>,
}

impl<'a> From<&'a NewNotification> for NewNotificationRow<'a> {
    fn from(n: &'a NewNotification) -> Self {
        NewNotificationRow {
            user_id: n.user_id,
            kind: n.kind.as_str(),
            message: &n.message,
            post_id: n.post_id,
            from_user_id: n.from_user_id,
        }
    }
}
