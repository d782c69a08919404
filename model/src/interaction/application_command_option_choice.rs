use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationCommandOptionChoice {
    pub name: Box<str>,
    pub value: ChoiceValue,
}

impl ApplicationCommandOptionChoice {
    pub fn new(name: impl Into<Box<str>>, value: impl Into<ChoiceValue>) -> Self {
        ApplicationCommandOptionChoice {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Choices are either strings or numbers on the wire. Integral numbers stay integers so that they
/// serialize back exactly as they were received.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ChoiceValue {
    String(Box<str>),
    Integer(i64),
    Number(f64),
}

impl From<&str> for ChoiceValue {
    fn from(s: &str) -> Self {
        ChoiceValue::String(Box::from(s))
    }
}

impl From<String> for ChoiceValue {
    fn from(s: String) -> Self {
        ChoiceValue::String(s.into_boxed_str())
    }
}

impl From<i64> for ChoiceValue {
    fn from(i: i64) -> Self {
        ChoiceValue::Integer(i)
    }
}

impl From<f64> for ChoiceValue {
    fn from(f: f64) -> Self {
        ChoiceValue::Number(f)
    }
}
