use crate::channel::ChannelType;
use crate::interaction::ApplicationCommandOptionChoice;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// One node of a command's option tree. Sub-command and sub-command-group nodes carry child
/// options, every other kind is a leaf parameter.
///
/// Optional keys are kept as `Option` so a command read from the API serializes back with exactly
/// the keys it arrived with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationCommandOption {
    pub r#type: ApplicationCommandOptionType,
    pub name: Box<str>,
    pub description: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ApplicationCommandOptionChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ApplicationCommandOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_types: Option<Vec<ChannelType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<bool>,
    /// Constraints such as `min_value` or `max_length` that are passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationCommandOption {
    pub fn new(
        r#type: ApplicationCommandOptionType,
        name: impl Into<Box<str>>,
        description: impl Into<Box<str>>,
    ) -> Self {
        ApplicationCommandOption {
            r#type,
            name: name.into(),
            description: description.into(),
            default: None,
            required: None,
            choices: None,
            options: None,
            channel_types: None,
            autocomplete: None,
            extra: Map::new(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_default(&self) -> bool {
        self.default.unwrap_or(false)
    }

    pub fn options(&self) -> &[ApplicationCommandOption] {
        self.options.as_deref().unwrap_or(&[])
    }

    pub fn choices(&self) -> &[ApplicationCommandOptionChoice] {
        self.choices.as_deref().unwrap_or(&[])
    }

    pub fn find_option(&self, name: &str) -> Option<&ApplicationCommandOption> {
        self.options().iter().find(|o| &*o.name == name)
    }
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ApplicationCommandOptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl ApplicationCommandOptionType {
    /// Sub-commands and groups are the only kinds allowed to nest options.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }

    pub fn accepts_choices(&self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }

    /// Values of these kinds are object ids, sent as strings.
    pub fn is_snowflake(&self) -> bool {
        matches!(
            self,
            Self::User | Self::Channel | Self::Role | Self::Mentionable | Self::Attachment
        )
    }
}

impl TryFrom<u64> for ApplicationCommandOptionType {
    type Error = Box<str>;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::SubCommand,
            2 => Self::SubCommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            _ => {
                return Err(
                    format!("invalid application command option type \"{}\"", value)
                        .into_boxed_str(),
                )
            }
        })
    }
}
