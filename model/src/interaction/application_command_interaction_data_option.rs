use crate::interaction::ApplicationCommandOptionType;
use crate::Snowflake;
use serde::Serialize;

/// A value the invoking user supplied for one option, or a sub-command / group node wrapping the
/// options nested under it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ApplicationCommandInteractionDataOption {
    pub name: Box<str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<ApplicationCommandOptionType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<OptionValue>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ApplicationCommandInteractionDataOption>,
}

impl ApplicationCommandInteractionDataOption {
    pub fn get(&self, name: &str) -> Option<&ApplicationCommandInteractionDataOption> {
        self.options.iter().find(|o| &*o.name == name)
    }

    pub fn is_group(&self) -> bool {
        self.r#type.map_or(false, |t| t.is_group())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OptionValue {
    String(Box<str>),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Snowflake(Snowflake),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats, matching how the platform treats number options.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(f) => Some(*f),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_snowflake(&self) -> Option<Snowflake> {
        match self {
            OptionValue::Snowflake(id) => Some(*id),
            _ => None,
        }
    }
}
