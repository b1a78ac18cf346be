use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only display projection of a user, used to decorate comments and to
/// render notification messages.
#[derive(Queryable, Selectable, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Profile {
    /// The name shown to other users: the full name when one is set,
    /// otherwise the username.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// Stand-in for authors whose profile row is gone.
    pub fn placeholder(id: Uuid) -> Self {
        Profile {
            id,
            username: "deleted".into(),
            full_name: None,
            avatar_url: None,
        }
    }
}
