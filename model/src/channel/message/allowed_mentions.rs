use crate::Snowflake;
use serde::{Deserialize, Serialize};

/// Which mentions in a message's content are allowed to notify anyone.
///
/// A field left as `None` is "unset": it contributes nothing to a [`merge`](Self::merge) and
/// serializes the same as a disabled target.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(from = "AllowedMentionsPayload", into = "AllowedMentionsPayload")]
pub struct AllowedMentions {
    pub everyone: Option<bool>,
    pub users: Option<MentionTarget>,
    pub roles: Option<MentionTarget>,
    pub replied_user: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MentionTarget {
    All,
    Disabled,
    Only(Vec<Snowflake>),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    Everyone,
    Users,
    Roles,
}

impl AllowedMentions {
    pub fn all() -> AllowedMentions {
        AllowedMentions {
            everyone: Some(true),
            users: Some(MentionTarget::All),
            roles: Some(MentionTarget::All),
            replied_user: Some(true),
        }
    }

    pub fn none() -> AllowedMentions {
        AllowedMentions {
            everyone: Some(false),
            users: Some(MentionTarget::Disabled),
            roles: Some(MentionTarget::Disabled),
            replied_user: Some(false),
        }
    }

    pub fn everyone(mut self, allowed: bool) -> Self {
        self.everyone = Some(allowed);
        self
    }

    pub fn users(mut self, target: MentionTarget) -> Self {
        self.users = Some(target);
        self
    }

    pub fn roles(mut self, target: MentionTarget) -> Self {
        self.roles = Some(target);
        self
    }

    pub fn replied_user(mut self, allowed: bool) -> Self {
        self.replied_user = Some(allowed);
        self
    }

    /// Combines a policy (`self`) with a caller's settings. Keys set on `self` win, keys `self`
    /// leaves unset are taken from `other`.
    pub fn merge(&self, other: &AllowedMentions) -> AllowedMentions {
        AllowedMentions {
            everyone: self.everyone.or(other.everyone),
            users: self.users.clone().or_else(|| other.users.clone()),
            roles: self.roles.clone().or_else(|| other.roles.clone()),
            replied_user: self.replied_user.or(other.replied_user),
        }
    }
}

/// Wire shape of the allowed mentions object.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct AllowedMentionsPayload {
    #[serde(default)]
    parse: Vec<MentionType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    roles: Vec<Snowflake>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    users: Vec<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replied_user: Option<bool>,
}

impl From<AllowedMentions> for AllowedMentionsPayload {
    fn from(mentions: AllowedMentions) -> Self {
        let mut payload = AllowedMentionsPayload {
            parse: Vec::new(),
            roles: Vec::new(),
            users: Vec::new(),
            replied_user: None,
        };

        if mentions.everyone == Some(true) {
            payload.parse.push(MentionType::Everyone);
        }

        match mentions.users {
            Some(MentionTarget::All) => payload.parse.push(MentionType::Users),
            Some(MentionTarget::Only(ids)) => payload.users = ids,
            Some(MentionTarget::Disabled) | None => {}
        }

        match mentions.roles {
            Some(MentionTarget::All) => payload.parse.push(MentionType::Roles),
            Some(MentionTarget::Only(ids)) => payload.roles = ids,
            Some(MentionTarget::Disabled) | None => {}
        }

        if mentions.replied_user == Some(true) {
            payload.replied_user = Some(true);
        }

        payload
    }
}

impl From<AllowedMentionsPayload> for AllowedMentions {
    fn from(payload: AllowedMentionsPayload) -> Self {
        let target = |kind: MentionType, ids: Vec<Snowflake>| {
            if payload.parse.contains(&kind) {
                MentionTarget::All
            } else if !ids.is_empty() {
                MentionTarget::Only(ids)
            } else {
                MentionTarget::Disabled
            }
        };

        AllowedMentions {
            everyone: Some(payload.parse.contains(&MentionType::Everyone)),
            users: Some(target(MentionType::Users, payload.users.clone())),
            roles: Some(target(MentionType::Roles, payload.roles.clone())),
            replied_user: payload.replied_user,
        }
    }
}
