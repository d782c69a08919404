use crate::interaction::{ApplicationCommandOption, ApplicationCommandType};
use crate::Snowflake;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A command as registered with the platform. Identity is `id`; `guild_id` is present only for
/// guild-scoped commands.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplicationCommand {
    pub id: Snowflake,
    pub application_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<ApplicationCommandType>,
    pub name: Box<str>,
    pub description: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ApplicationCommandOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_permission: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Snowflake>,
    /// Keys this model does not name, such as `dm_permission` or `nsfw`. Written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationCommand {
    pub fn is_global(&self) -> bool {
        self.guild_id.is_none()
    }

    pub fn options(&self) -> &[ApplicationCommandOption] {
        self.options.as_deref().unwrap_or(&[])
    }

    pub fn find_option(&self, name: &str) -> Option<&ApplicationCommandOption> {
        self.options().iter().find(|o| &*o.name == name)
    }
}

impl PartialEq for ApplicationCommand {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Body used to create or overwrite a command: everything the platform does not assign itself.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<ApplicationCommandType>,
    pub name: Box<str>,
    pub description: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ApplicationCommandOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_permission: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&ApplicationCommand> for CommandDefinition {
    fn from(command: &ApplicationCommand) -> Self {
        CommandDefinition {
            r#type: command.r#type,
            name: command.name.clone(),
            description: command.description.clone(),
            options: command.options.clone(),
            default_permission: command.default_permission,
            extra: command.extra.clone(),
        }
    }
}
