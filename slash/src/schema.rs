//! Validation and construction of application command schemas.
//!
//! Raw JSON is checked by hand before it is handed to serde, so a bad definition fails with the
//! name of the offending field and unknown option kinds surface as
//! [`Error::UnknownOptionType`] instead of a generic decode error.

use crate::{Error, Result};
use model::interaction::{
    ApplicationCommand, ApplicationCommandOption, ApplicationCommandOptionChoice,
    ApplicationCommandOptionType, ApplicationCommandType, CommandDefinition,
};
use model::channel::ChannelType;
use model::Snowflake;
use serde_json::{Map, Value};

/// Platform limit on the number of choices an option may offer.
pub const MAX_CHOICES: usize = 25;

/// Parses a registered command as returned by the API.
pub fn parse(raw: &Value) -> Result<ApplicationCommand> {
    let object = as_object(raw, "command")?;

    require_snowflake(object, "id")?;
    require_snowflake(object, "application_id")?;
    optional_snowflake(object, "guild_id")?;
    optional_snowflake(object, "version")?;
    validate_definition(object)?;

    serde_json::from_value(raw.clone()).map_err(|e| Error::SchemaError(e.to_string()))
}

/// Parses a command definition as used in registration bodies: the same rules as [`parse`],
/// without the ids the platform assigns.
pub fn parse_definition(raw: &Value) -> Result<CommandDefinition> {
    let object = as_object(raw, "command")?;
    validate_definition(object)?;

    serde_json::from_value(raw.clone()).map_err(|e| Error::SchemaError(e.to_string()))
}

/// Serializes a command back to its wire form. `to_wire(&parse(x)?)? == x` for any command `x`
/// accepted by [`parse`]: keys without a named field are carried in `extra`, and input that
/// could not be written back identically is rejected by [`parse`] instead.
pub fn to_wire(command: &ApplicationCommand) -> Result<Value> {
    Ok(serde_json::to_value(command)?)
}

fn validate_definition(object: &Map<String, Value>) -> Result<()> {
    require_str(object, "name", "command")?;
    require_str(object, "description", "command")?;

    if let Some(kind) = object.get("type") {
        let kind = kind
            .as_u64()
            .ok_or_else(|| Error::SchemaError("command type must be an integer".to_owned()))?;

        serde_json::from_value::<ApplicationCommandType>(Value::from(kind))
            .map_err(|_| Error::SchemaError(format!("unknown command type {}", kind)))?;
    }

    if let Some(b) = object.get("default_permission") {
        if !b.is_boolean() {
            return Error::SchemaError("default_permission must be a boolean".to_owned()).into();
        }
    }

    if let Some(options) = object.get("options") {
        validate_options(options, None, "command")?;
    }

    Ok(())
}

fn validate_options(
    raw: &Value,
    parent: Option<ApplicationCommandOptionType>,
    path: &str,
) -> Result<()> {
    let options = raw
        .as_array()
        .ok_or_else(|| Error::SchemaError(format!("{}.options must be an array", path)))?;

    for option in options {
        let object = as_object(option, path)?;
        let name = require_str(object, "name", path)?;
        let path = format!("{}.{}", path, name);

        require_str(object, "description", &path)?;

        let kind = object
            .get("type")
            .ok_or_else(|| Error::SchemaError(format!("{} is missing type", path)))?;
        let kind = option_type(kind, &path)?;

        if let Some(parent) = parent {
            check_child(parent, kind, &path)?;
        }

        for key in ["default", "required", "autocomplete"] {
            if let Some(v) = object.get(key) {
                if !v.is_boolean() {
                    return Error::SchemaError(format!("{}.{} must be a boolean", path, key))
                        .into();
                }
            }
        }

        if let Some(choices) = object.get("choices") {
            validate_choices(choices, &path)?;
        }

        if let Some(channel_types) = object.get("channel_types") {
            validate_channel_types(channel_types, &path)?;
        }

        if let Some(children) = object.get("options") {
            let empty = children.as_array().map_or(false, Vec::is_empty);
            if !kind.is_group() && !empty {
                return Error::SchemaError(format!(
                    "{} is a {:?} option and cannot have sub-options",
                    path, kind
                ))
                .into();
            }

            validate_options(children, Some(kind), &path)?;
        }
    }

    Ok(())
}

fn validate_choices(raw: &Value, path: &str) -> Result<()> {
    let choices = raw
        .as_array()
        .ok_or_else(|| Error::SchemaError(format!("{}.choices must be an array", path)))?;

    for choice in choices {
        let object = as_object(choice, path)?;
        require_str(object, "name", path)?;

        match object.get("value") {
            Some(Value::String(_)) => {}
            Some(Value::Number(n)) if n.is_i64() || n.is_f64() => {}
            Some(Value::Number(n)) => {
                return Error::SchemaError(format!(
                    "{} has an integer choice {} outside the signed 64-bit range",
                    path, n
                ))
                .into()
            }
            _ => {
                return Error::SchemaError(format!(
                    "{} has a choice whose value is not a string or number",
                    path
                ))
                .into()
            }
        }
    }

    Ok(())
}

fn validate_channel_types(raw: &Value, path: &str) -> Result<()> {
    let valid = raw.as_array().map_or(false, |kinds| {
        kinds
            .iter()
            .all(|k| k.as_u64().map_or(false, |k| ChannelType::try_from(k).is_ok()))
    });

    if valid {
        Ok(())
    } else {
        Error::SchemaError(format!("{}.channel_types must be an array of channel types", path))
            .into()
    }
}

fn option_type(raw: &Value, path: &str) -> Result<ApplicationCommandOptionType> {
    let value = raw
        .as_u64()
        .ok_or_else(|| Error::SchemaError(format!("{}.type must be an integer", path)))?;

    ApplicationCommandOptionType::try_from(value).map_err(|_| Error::UnknownOptionType(value))
}

/// Groups may only hold sub-commands, sub-commands may only hold parameters.
fn check_child(
    parent: ApplicationCommandOptionType,
    child: ApplicationCommandOptionType,
    path: &str,
) -> Result<()> {
    use ApplicationCommandOptionType::*;

    let allowed = match parent {
        SubCommandGroup => child == SubCommand,
        SubCommand => !child.is_group(),
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Error::SchemaError(format!(
            "{} of type {:?} cannot be nested under a {:?} option",
            path, child, parent
        ))
        .into()
    }
}

fn as_object<'a>(raw: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| Error::SchemaError(format!("{} must be a JSON object", path)))
}

fn require_str<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a str> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Error::SchemaError(format!("{}.{} must be a string", path, key)).into(),
        None => Error::SchemaError(format!("{} is missing {}", path, key)).into(),
    }
}

fn require_snowflake(object: &Map<String, Value>, key: &str) -> Result<Snowflake> {
    let value = object
        .get(key)
        .ok_or_else(|| Error::SchemaError(format!("command is missing {}", key)))?;

    // ids are always strings on the wire, a numeric id could not be written back as received
    match value {
        Value::String(_) => Snowflake::from_value(value),
        _ => None,
    }
    .ok_or_else(|| Error::SchemaError(format!("command.{} must be a snowflake string", key)))
}

fn optional_snowflake(object: &Map<String, Value>, key: &str) -> Result<()> {
    match object.get(key) {
        Some(_) => require_snowflake(object, key).map(|_| ()),
        None => Ok(()),
    }
}

/// Loosely typed description of a new option. The `type` is kept as a raw integer so input from
/// configuration files can be validated at the point the option is attached.
#[derive(Debug, Clone)]
pub struct OptionDraft {
    pub r#type: u64,
    pub name: String,
    pub description: String,
    pub default: Option<bool>,
    pub required: Option<bool>,
    pub choices: Vec<ApplicationCommandOptionChoice>,
}

impl OptionDraft {
    pub fn new(
        r#type: ApplicationCommandOptionType,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> OptionDraft {
        OptionDraft::raw(r#type as u64, name, description)
    }

    pub fn raw(
        r#type: u64,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> OptionDraft {
        OptionDraft {
            r#type,
            name: name.into(),
            description: description.into(),
            default: None,
            required: None,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    pub fn choice(
        mut self,
        name: impl Into<Box<str>>,
        value: impl Into<model::interaction::ChoiceValue>,
    ) -> Self {
        self.choices
            .push(ApplicationCommandOptionChoice::new(name, value));
        self
    }

    /// Turns the draft into a typed option, rejecting anything the platform would refuse.
    fn into_option(self) -> Result<ApplicationCommandOption> {
        let kind = ApplicationCommandOptionType::try_from(self.r#type)
            .map_err(|_| Error::UnknownOptionType(self.r#type))?;

        if self.name.is_empty() || self.description.is_empty() {
            return Error::SchemaError("option name and description must not be empty".to_owned())
                .into();
        }

        if !self.choices.is_empty() {
            if !kind.accepts_choices() {
                return Error::SchemaError(format!(
                    "{} is a {:?} option and cannot have choices",
                    self.name, kind
                ))
                .into();
            }

            if self.choices.len() > MAX_CHOICES {
                return Error::SchemaError(format!(
                    "{} has {} choices, the maximum is {}",
                    self.name,
                    self.choices.len(),
                    MAX_CHOICES
                ))
                .into();
            }
        }

        let mut option = ApplicationCommandOption::new(kind, self.name, self.description);
        option.default = self.default;
        option.required = self.required;
        if !self.choices.is_empty() {
            option.choices = Some(self.choices);
        }

        Ok(option)
    }
}

/// Appends a child option to `parent` and returns it for chaining. The parent is left untouched
/// when validation fails.
pub fn add_option(
    parent: &mut ApplicationCommandOption,
    draft: OptionDraft,
) -> Result<&mut ApplicationCommandOption> {
    let option = draft.into_option()?;
    check_child(parent.r#type, option.r#type, &option.name)?;

    let children = parent.options.get_or_insert_with(Vec::new);
    let index = children.len();
    children.push(option);

    Ok(&mut children[index])
}

/// Handle to an option node inside a [`CommandBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionId(usize);

#[derive(Debug)]
struct OptionNode {
    option: ApplicationCommandOption,
    children: Vec<usize>,
}

/// Builds a new command definition. Options live in a flat arena and refer to their children by
/// index; the nested tree is only materialized by [`build`](Self::build).
#[derive(Debug)]
pub struct CommandBuilder {
    name: String,
    description: String,
    r#type: Option<ApplicationCommandType>,
    default_permission: Option<bool>,
    nodes: Vec<OptionNode>,
    roots: Vec<usize>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            description: description.into(),
            r#type: None,
            default_permission: None,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn command_type(mut self, r#type: ApplicationCommandType) -> Self {
        self.r#type = Some(r#type);
        self
    }

    pub fn default_permission(mut self, default_permission: bool) -> Self {
        self.default_permission = Some(default_permission);
        self
    }

    /// Adds an option at the top level (`parent == None`) or under an existing node.
    pub fn add_option(&mut self, parent: Option<OptionId>, draft: OptionDraft) -> Result<OptionId> {
        let option = draft.into_option()?;

        if let Some(OptionId(parent)) = parent {
            let node = self.nodes.get(parent).ok_or_else(|| {
                Error::SchemaError(format!("no option with id {} in this builder", parent))
            })?;

            check_child(node.option.r#type, option.r#type, &option.name)?;
        }

        let id = self.nodes.len();
        self.nodes.push(OptionNode {
            option,
            children: Vec::new(),
        });

        match parent {
            Some(OptionId(parent)) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }

        Ok(OptionId(id))
    }

    pub fn build(self) -> CommandDefinition {
        let options: Vec<_> = self
            .roots
            .iter()
            .map(|&root| materialize(&self.nodes, root))
            .collect();

        CommandDefinition {
            r#type: self.r#type,
            name: self.name.into_boxed_str(),
            description: self.description.into_boxed_str(),
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
            default_permission: self.default_permission,
            extra: Map::new(),
        }
    }
}

fn materialize(nodes: &[OptionNode], index: usize) -> ApplicationCommandOption {
    let node = &nodes[index];
    let mut option = node.option.clone();

    if !node.children.is_empty() {
        option.options = Some(
            node.children
                .iter()
                .map(|&child| materialize(nodes, child))
                .collect(),
        );
    }

    option
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::interaction::ChoiceValue;
    use serde_json::json;

    fn ticket_command() -> Value {
        json!({
            "id": "1011",
            "application_id": "508391840525975553",
            "guild_id": "1",
            "type": 1,
            "name": "ticket",
            "description": "Manage tickets",
            "version": "1080000000000000000",
            "options": [
                {
                    "type": 1,
                    "name": "open",
                    "description": "Open a ticket",
                    "options": [
                        {
                            "type": 3,
                            "name": "subject",
                            "description": "What is it about",
                            "required": false,
                            "choices": [
                                {"name": "Billing", "value": "billing"},
                                {"name": "Priority", "value": 2},
                                {"name": "Ratio", "value": 0.5}
                            ]
                        },
                        {"type": 6, "name": "for", "description": "Open on behalf of"}
                    ]
                },
                {
                    "type": 2,
                    "name": "tags",
                    "description": "Manage tags",
                    "options": [
                        {"type": 1, "name": "list", "description": "List tags", "options": []}
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_round_trip() {
        let raw = ticket_command();
        let command = parse(&raw).unwrap();
        assert_eq!(to_wire(&command).unwrap(), raw);
    }

    #[test]
    fn test_round_trip_minimal_global() {
        let raw = json!({
            "id": "5",
            "application_id": "6",
            "name": "ping",
            "description": "Pong"
        });

        let command = parse(&raw).unwrap();
        assert!(command.is_global());
        assert!(command.options().is_empty());
        assert_eq!(to_wire(&command).unwrap(), raw);
    }

    #[test]
    fn test_numeric_ids_rejected() {
        let res = parse(&json!({
            "id": 5,
            "application_id": 6,
            "name": "ping",
            "description": "Pong"
        }));

        match res {
            Err(Error::SchemaError(msg)) => assert!(msg.contains("id"), "{}", msg),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_keeps_unnamed_keys() {
        let raw = json!({
            "id": "1",
            "application_id": "2",
            "name": "ping",
            "description": "Pong",
            "default_member_permissions": null,
            "dm_permission": true,
            "nsfw": false,
            "options": [{
                "type": 4,
                "name": "n",
                "description": "d",
                "min_value": 1,
                "max_value": 5
            }]
        });

        let command = parse(&raw).unwrap();
        assert_eq!(command.extra.get("dm_permission"), Some(&json!(true)));
        assert_eq!(to_wire(&command).unwrap(), raw);

        let definition = CommandDefinition::from(&command);
        assert_eq!(definition.extra.get("nsfw"), Some(&json!(false)));
    }

    #[test]
    fn test_out_of_range_integer_choice_rejected() {
        let mut raw = ticket_command();
        raw["options"][0]["options"][0]["choices"][1]["value"] = json!(u64::MAX);

        assert!(matches!(parse(&raw), Err(Error::SchemaError(_))));

        raw["options"][0]["options"][0]["choices"][1]["value"] = json!(i64::MIN);
        let command = parse(&raw).unwrap();
        assert_eq!(to_wire(&command).unwrap(), raw);
    }

    #[test]
    fn test_channel_types_validated() {
        let mut raw = ticket_command();
        raw["options"][0]["options"][1]["type"] = json!(7);
        raw["options"][0]["options"][1]["channel_types"] = json!([0, 11]);

        let command = parse(&raw).unwrap();
        assert_eq!(to_wire(&command).unwrap(), raw);

        raw["options"][0]["options"][1]["channel_types"] = json!(null);
        assert!(matches!(parse(&raw), Err(Error::SchemaError(_))));

        raw["options"][0]["options"][1]["channel_types"] = json!([99]);
        assert!(matches!(parse(&raw), Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_parsed_tree() {
        let command = parse(&ticket_command()).unwrap();

        let open = command.find_option("open").unwrap();
        assert_eq!(open.r#type, ApplicationCommandOptionType::SubCommand);

        let subject = open.find_option("subject").unwrap();
        assert!(!subject.is_required());
        assert_eq!(subject.choices()[1].value, ChoiceValue::Integer(2));
    }

    #[test]
    fn test_missing_required_fields() {
        for key in ["id", "application_id", "name", "description"] {
            let mut raw = ticket_command();
            raw.as_object_mut().unwrap().remove(key);

            match parse(&raw) {
                Err(Error::SchemaError(msg)) => assert!(msg.contains(key), "{}", msg),
                other => panic!("expected schema error for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_wrong_field_types() {
        let mut raw = ticket_command();
        raw["name"] = json!(12);
        assert!(matches!(parse(&raw), Err(Error::SchemaError(_))));

        let mut raw = ticket_command();
        raw["id"] = json!("not a number");
        assert!(matches!(parse(&raw), Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_unknown_option_type_in_tree() {
        let mut raw = ticket_command();
        raw["options"][0]["options"][1]["type"] = json!(42);

        assert!(matches!(parse(&raw), Err(Error::UnknownOptionType(42))));
    }

    #[test]
    fn test_options_on_leaf_rejected() {
        let mut raw = ticket_command();
        raw["options"][0]["options"][1]["options"] =
            json!([{"type": 3, "name": "x", "description": "y"}]);

        assert!(matches!(parse(&raw), Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_add_option_chaining() {
        let mut group = ApplicationCommandOption::new(
            ApplicationCommandOptionType::SubCommandGroup,
            "panel",
            "Manage panels",
        );

        let create = add_option(
            &mut group,
            OptionDraft::new(ApplicationCommandOptionType::SubCommand, "create", "Create one"),
        )
        .unwrap();

        add_option(
            create,
            OptionDraft::new(ApplicationCommandOptionType::Integer, "colour", "Embed colour")
                .required(true)
                .choice("Green", 0x2ECC71i64),
        )
        .unwrap();

        let create = group.find_option("create").unwrap();
        let colour = create.find_option("colour").unwrap();
        assert!(colour.is_required());
        assert_eq!(colour.choices().len(), 1);
    }

    #[test]
    fn test_add_option_unknown_type_leaves_parent() {
        let mut parent = ApplicationCommandOption::new(
            ApplicationCommandOptionType::SubCommand,
            "open",
            "Open a ticket",
        );
        add_option(
            &mut parent,
            OptionDraft::new(ApplicationCommandOptionType::String, "subject", "Subject"),
        )
        .unwrap();

        let res = add_option(&mut parent, OptionDraft::raw(99, "bad", "Bad"));
        assert!(matches!(res, Err(Error::UnknownOptionType(99))));
        assert_eq!(parent.options().len(), 1);
    }

    #[test]
    fn test_add_option_to_leaf_rejected() {
        let mut leaf = ApplicationCommandOption::new(
            ApplicationCommandOptionType::String,
            "subject",
            "Subject",
        );

        let res = add_option(
            &mut leaf,
            OptionDraft::new(ApplicationCommandOptionType::String, "x", "y"),
        );
        assert!(matches!(res, Err(Error::SchemaError(_))));
        assert!(leaf.options.is_none());
    }

    #[test]
    fn test_choices_on_boolean_rejected() {
        let mut parent =
            ApplicationCommandOption::new(ApplicationCommandOptionType::SubCommand, "a", "b");

        let res = add_option(
            &mut parent,
            OptionDraft::new(ApplicationCommandOptionType::Boolean, "flag", "Flag")
                .choice("x", 1i64),
        );
        assert!(matches!(res, Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_builder_materializes_tree() {
        let mut builder = CommandBuilder::new("ticket", "Manage tickets").default_permission(true);

        let tags = builder
            .add_option(
                None,
                OptionDraft::new(ApplicationCommandOptionType::SubCommandGroup, "tags", "Tags"),
            )
            .unwrap();
        let add = builder
            .add_option(
                Some(tags),
                OptionDraft::new(ApplicationCommandOptionType::SubCommand, "add", "Add a tag"),
            )
            .unwrap();
        builder
            .add_option(
                Some(add),
                OptionDraft::new(ApplicationCommandOptionType::String, "name", "Tag name")
                    .required(true),
            )
            .unwrap();
        builder
            .add_option(
                Some(tags),
                OptionDraft::new(ApplicationCommandOptionType::SubCommand, "list", "List tags"),
            )
            .unwrap();

        let definition = builder.build();
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "name": "ticket",
                "description": "Manage tickets",
                "default_permission": true,
                "options": [{
                    "type": 2,
                    "name": "tags",
                    "description": "Tags",
                    "options": [
                        {
                            "type": 1,
                            "name": "add",
                            "description": "Add a tag",
                            "options": [
                                {
                                    "type": 3,
                                    "name": "name",
                                    "description": "Tag name",
                                    "required": true
                                }
                            ]
                        },
                        {"type": 1, "name": "list", "description": "List tags"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_builder_rejects_bad_nesting() {
        let mut builder = CommandBuilder::new("ticket", "Manage tickets");
        let group = builder
            .add_option(
                None,
                OptionDraft::new(ApplicationCommandOptionType::SubCommandGroup, "tags", "Tags"),
            )
            .unwrap();

        let res = builder.add_option(
            Some(group),
            OptionDraft::new(ApplicationCommandOptionType::String, "name", "Name"),
        );
        assert!(matches!(res, Err(Error::SchemaError(_))));

        let res = builder.add_option(Some(OptionId(17)), OptionDraft::raw(3, "x", "y"));
        assert!(matches!(res, Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_parse_definition() {
        let definition = parse_definition(&json!({
            "name": "close",
            "description": "Close this ticket",
            "options": [{"type": 3, "name": "reason", "description": "Why"}]
        }))
        .unwrap();

        assert_eq!(&*definition.name, "close");
        assert!(parse_definition(&json!({"name": "close"})).is_err());
    }
}
