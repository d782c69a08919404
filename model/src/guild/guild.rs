use serde::{Deserialize, Serialize};

use crate::Snowflake;

/// The subset of guild state an interaction handler needs. Full guild objects are owned by
/// whatever cache the host application runs.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Guild {
    pub id: Snowflake,
    pub name: Box<str>,
    pub owner_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<Box<str>>,
}

impl PartialEq for Guild {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
