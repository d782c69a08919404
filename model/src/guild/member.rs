use serde::{Deserialize, Serialize};

use crate::user::User;
use crate::Snowflake;
use chrono::{DateTime, Utc};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Member {
    pub user: Option<User>,
    pub nick: Option<Box<str>>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
    /// Permissions of the member in the invoking channel, only present on interaction payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Box<str>>,
    /// Not part of the wire object. Filled in by the member factory from the resolved guild.
    #[serde(skip)]
    pub guild_id: Option<Snowflake>,
}

impl Member {
    pub fn user_id(&self) -> Option<Snowflake> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn display_name(&self) -> Option<&str> {
        match &self.nick {
            Some(nick) => Some(&**nick),
            None => self.user.as_ref().map(User::display_name),
        }
    }
}
