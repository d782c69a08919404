use crate::{Error, Result};
use model::channel::Channel;
use model::guild::{Guild, Member};
use model::interaction::{
    ApplicationCommandInteractionDataOption, ApplicationCommandOptionType, InteractionType,
    OptionValue,
};
use model::user::User;
use model::Snowflake;
use serde_json::{Map, Value};

/// Looks up the channel and guild an interaction was invoked in, usually from the host's cache.
pub trait ContextResolver {
    fn resolve(
        &self,
        guild_id: Option<Snowflake>,
        channel_id: Option<Snowflake>,
    ) -> (Option<Channel>, Option<Guild>);
}

impl<F> ContextResolver for F
where
    F: Fn(Option<Snowflake>, Option<Snowflake>) -> (Option<Channel>, Option<Guild>),
{
    fn resolve(
        &self,
        guild_id: Option<Snowflake>,
        channel_id: Option<Snowflake>,
    ) -> (Option<Channel>, Option<Guild>) {
        self(guild_id, channel_id)
    }
}

/// Resolver for hosts that keep no cache: only the raw ids are available.
pub struct Unresolved;

impl ContextResolver for Unresolved {
    fn resolve(
        &self,
        _: Option<Snowflake>,
        _: Option<Snowflake>,
    ) -> (Option<Channel>, Option<Guild>) {
        (None, None)
    }
}

/// Builds the invoking member from its raw payload. `guild_id` is the id the interaction was
/// invoked in, `guild` is whatever the resolver found for it.
pub trait MemberFactory {
    fn build(
        &self,
        raw: &Value,
        guild_id: Option<Snowflake>,
        guild: Option<&Guild>,
    ) -> Result<Member>;
}

/// Decodes the member object as sent and tags it with the guild it was invoked in.
pub struct DeserializeMember;

impl MemberFactory for DeserializeMember {
    fn build(
        &self,
        raw: &Value,
        guild_id: Option<Snowflake>,
        guild: Option<&Guild>,
    ) -> Result<Member> {
        let mut member: Member = serde_json::from_value(raw.clone())
            .map_err(|e| Error::MalformedInteraction(format!("invalid member: {}", e)))?;

        member.guild_id = guild.map(|g| g.id).or(guild_id);
        Ok(member)
    }
}

/// One invocation of an application command. Immutable once parsed; responses go through a
/// [`Responder`](crate::Responder) bound to the same id and token.
#[derive(Debug, Clone)]
pub struct Interaction {
    id: Snowflake,
    application_id: Option<Snowflake>,
    kind: InteractionType,
    token: Box<str>,
    version: u8,
    guild_id: Option<Snowflake>,
    channel_id: Option<Snowflake>,
    channel: Option<Channel>,
    guild: Option<Guild>,
    member: Option<Member>,
    user: Option<User>,
    command_id: Option<Snowflake>,
    command_name: Box<str>,
    options: Vec<ApplicationCommandInteractionDataOption>,
}

impl Interaction {
    pub fn parse<R: ContextResolver>(raw: &Value, resolver: &R) -> Result<Interaction> {
        Interaction::parse_with(raw, resolver, &DeserializeMember)
    }

    pub fn parse_with<R, M>(raw: &Value, resolver: &R, members: &M) -> Result<Interaction>
    where
        R: ContextResolver,
        M: MemberFactory,
    {
        let object = raw
            .as_object()
            .ok_or_else(|| malformed("payload is not a JSON object"))?;

        let id = object
            .get("id")
            .and_then(Snowflake::from_value)
            .ok_or_else(|| malformed("missing or invalid id"))?;

        let token = object
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing or invalid token"))?;

        let kind = object
            .get("type")
            .and_then(Value::as_u64)
            .ok_or_else(|| Box::from("missing or invalid type"))
            .and_then(InteractionType::try_from)
            .map_err(|e| Error::MalformedInteraction(e.into()))?;

        let data = object
            .get("data")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("missing data"))?;

        let command_name = data
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing data.name"))?;

        let command_id = optional_snowflake(data, "id")?;
        let application_id = optional_snowflake(object, "application_id")?;
        let guild_id = optional_snowflake(object, "guild_id")?;
        let channel_id = optional_snowflake(object, "channel_id")?;

        let version = match object.get("version") {
            None | Some(Value::Null) => 1,
            Some(v) => v
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| malformed("invalid version"))?,
        };

        let options = match data.get("options") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => decode_options(raw)?,
        };

        let (channel, guild) = resolver.resolve(guild_id, channel_id);

        let member = match object.get("member") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(members.build(raw, guild_id, guild.as_ref())?),
        };

        let user = match object.get("user") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value(raw.clone())
                    .map_err(|e| Error::MalformedInteraction(format!("invalid user: {}", e)))?,
            ),
        };

        Ok(Interaction {
            id,
            application_id,
            kind,
            token: Box::from(token),
            version,
            guild_id,
            channel_id,
            channel,
            guild,
            member,
            user,
            command_id,
            command_name: Box::from(command_name),
            options,
        })
    }

    pub fn id(&self) -> Snowflake {
        self.id
    }

    pub fn application_id(&self) -> Option<Snowflake> {
        self.application_id
    }

    pub fn kind(&self) -> InteractionType {
        self.kind
    }

    /// Short-lived credential for every response action on this interaction.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.guild_id
    }

    pub fn channel_id(&self) -> Option<Snowflake> {
        self.channel_id
    }

    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    pub fn guild(&self) -> Option<&Guild> {
        self.guild.as_ref()
    }

    pub fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The invoking user: taken from the member in guilds and from `user` in DMs.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn command_id(&self) -> Option<Snowflake> {
        self.command_id
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn options(&self) -> &[ApplicationCommandInteractionDataOption] {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&ApplicationCommandInteractionDataOption> {
        self.options.iter().find(|o| &*o.name == name)
    }

    /// Walks down through sub-command groups and sub-commands. Returns the names passed on the
    /// way and the parameters of the innermost sub-command.
    pub fn leaf_options(&self) -> (Vec<&str>, &[ApplicationCommandInteractionDataOption]) {
        let mut path = Vec::new();
        let mut options = &self.options[..];

        while let [only] = options {
            if !only.is_group() {
                break;
            }

            path.push(&*only.name);
            options = &only.options[..];
        }

        (path, options)
    }
}

fn malformed(msg: &str) -> Error {
    Error::MalformedInteraction(msg.to_owned())
}

fn optional_snowflake(object: &Map<String, Value>, key: &str) -> Result<Option<Snowflake>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => Snowflake::from_value(v)
            .map(Some)
            .ok_or_else(|| Error::MalformedInteraction(format!("invalid {}", key))),
    }
}

fn decode_options(raw: &Value) -> Result<Vec<ApplicationCommandInteractionDataOption>> {
    raw.as_array()
        .ok_or_else(|| malformed("options is not an array"))?
        .iter()
        .map(decode_option)
        .collect()
}

fn decode_option(raw: &Value) -> Result<ApplicationCommandInteractionDataOption> {
    let object = raw
        .as_object()
        .ok_or_else(|| malformed("option is not a JSON object"))?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("option is missing name"))?;

    let kind = match object.get("type") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let value = v.as_u64().ok_or_else(|| {
                Error::MalformedInteraction(format!("option {} has a non-integer type", name))
            })?;

            Some(
                ApplicationCommandOptionType::try_from(value)
                    .map_err(|_| Error::UnknownOptionType(value))?,
            )
        }
    };

    let value = match object.get("value") {
        None | Some(Value::Null) => None,
        Some(v) => Some(decode_value(name, kind, v)?),
    };

    let options = match object.get("options") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => decode_options(raw)?,
    };

    Ok(ApplicationCommandInteractionDataOption {
        name: Box::from(name),
        r#type: kind,
        value,
        options,
    })
}

/// Types a submitted value by the option's declared kind, or by its JSON shape when the payload
/// does not say.
fn decode_value(
    name: &str,
    kind: Option<ApplicationCommandOptionType>,
    raw: &Value,
) -> Result<OptionValue> {
    use ApplicationCommandOptionType as Kind;

    let value = match kind {
        Some(Kind::String) => raw.as_str().map(|s| OptionValue::String(Box::from(s))),
        Some(Kind::Integer) => raw.as_i64().map(OptionValue::Integer),
        Some(Kind::Number) => raw.as_f64().map(OptionValue::Number),
        Some(Kind::Boolean) => raw.as_bool().map(OptionValue::Boolean),
        Some(k) if k.is_snowflake() => Snowflake::from_value(raw).map(OptionValue::Snowflake),
        Some(_) => {
            return Err(Error::MalformedInteraction(format!(
                "sub-command option {} cannot carry a value",
                name
            )))
        }
        None => match raw {
            Value::String(s) => Some(OptionValue::String(Box::from(s.as_str()))),
            Value::Bool(b) => Some(OptionValue::Boolean(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(OptionValue::Integer)
                .or_else(|| n.as_f64().map(OptionValue::Number)),
            _ => None,
        },
    };

    value.ok_or_else(|| {
        Error::MalformedInteraction(format!(
            "option {} has a value that does not match its type",
            name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::channel::ChannelType;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "id": "786008729715212338",
            "application_id": "508391840525975553",
            "type": 2,
            "token": "A_UNIQUE_TOKEN",
            "version": 1,
            "guild_id": "290926798626357999",
            "channel_id": "645027906669510667",
            "member": {
                "user": {
                    "id": "53908232506183680",
                    "username": "Mason",
                    "avatar": null
                },
                "nick": null,
                "roles": ["539082325061836999"],
                "joined_at": "2017-03-13T19:19:14.040000+00:00",
                "deaf": false,
                "mute": false,
                "permissions": "2147483647"
            },
            "data": {
                "id": "771825006014889984",
                "name": "ticket",
                "options": [{
                    "type": 2,
                    "name": "tags",
                    "options": [{
                        "type": 1,
                        "name": "add",
                        "options": [
                            {"type": 3, "name": "name", "value": "faq"},
                            {"type": 4, "name": "uses", "value": 3},
                            {"type": 10, "name": "weight", "value": 2},
                            {"type": 5, "name": "pinned", "value": true},
                            {"type": 6, "name": "owner", "value": "53908232506183680"}
                        ]
                    }]
                }]
            }
        })
    }

    fn resolver(
        guild_id: Option<Snowflake>,
        channel_id: Option<Snowflake>,
    ) -> (Option<Channel>, Option<Guild>) {
        let channel = channel_id.map(|id| Channel {
            id,
            channel_type: ChannelType::GuildText,
            guild_id,
            name: Some(Box::from("support")),
            parent_id: None,
            nsfw: None,
        });

        let guild = guild_id.map(|id| Guild {
            id,
            name: Box::from("Tickets"),
            owner_id: Snowflake(1),
            icon: None,
            preferred_locale: None,
        });

        (channel, guild)
    }

    #[test]
    fn test_parse_envelope() {
        let interaction = Interaction::parse(&payload(), &resolver).unwrap();

        assert_eq!(interaction.id(), Snowflake(786008729715212338));
        assert_eq!(interaction.kind(), InteractionType::ApplicationCommand);
        assert_eq!(interaction.token(), "A_UNIQUE_TOKEN");
        assert_eq!(interaction.command_name(), "ticket");
        assert_eq!(interaction.command_id(), Some(Snowflake(771825006014889984)));
        assert_eq!(interaction.version(), 1);

        assert_eq!(interaction.channel().unwrap().id, Snowflake(645027906669510667));
        assert_eq!(interaction.guild().unwrap().id, Snowflake(290926798626357999));

        let member = interaction.member().unwrap();
        assert_eq!(member.guild_id, Some(Snowflake(290926798626357999)));
        assert_eq!(member.display_name(), Some("Mason"));
        assert_eq!(interaction.invoker().unwrap().id, Snowflake(53908232506183680));
    }

    #[test]
    fn test_member_guild_without_resolver() {
        let interaction = Interaction::parse(&payload(), &Unresolved).unwrap();

        assert!(interaction.guild().is_none());
        assert_eq!(
            interaction.member().unwrap().guild_id,
            Some(Snowflake(290926798626357999))
        );
    }

    #[test]
    fn test_typed_nested_options() {
        let interaction = Interaction::parse(&payload(), &Unresolved).unwrap();
        assert!(interaction.channel().is_none());

        let (path, options) = interaction.leaf_options();
        assert_eq!(path, vec!["tags", "add"]);
        assert_eq!(options.len(), 5);

        let value = |i: usize| options[i].value.clone().unwrap();
        assert_eq!(value(0), OptionValue::String(Box::from("faq")));
        assert_eq!(value(1), OptionValue::Integer(3));
        assert_eq!(value(2), OptionValue::Number(2.0));
        assert_eq!(value(3), OptionValue::Boolean(true));
        assert_eq!(value(4), OptionValue::Snowflake(Snowflake(53908232506183680)));
    }

    #[test]
    fn test_untyped_values_inferred() {
        let mut raw = payload();
        raw["data"]["options"] = json!([
            {"name": "a", "value": "x"},
            {"name": "b", "value": 4},
            {"name": "c", "value": 4.5},
            {"name": "d", "value": false}
        ]);

        let interaction = Interaction::parse(&raw, &Unresolved).unwrap();
        let values: Vec<_> = interaction
            .options()
            .iter()
            .map(|o| o.value.clone().unwrap())
            .collect();

        assert_eq!(
            values,
            vec![
                OptionValue::String(Box::from("x")),
                OptionValue::Integer(4),
                OptionValue::Number(4.5),
                OptionValue::Boolean(false),
            ]
        );
        assert_eq!(interaction.option("b").unwrap().value.as_ref().unwrap().as_f64(), Some(4.0));
    }

    #[test]
    fn test_required_fields() {
        for (path, field) in [
            ("", "id"),
            ("", "token"),
            ("", "type"),
            ("data", "name"),
        ] {
            let mut raw = payload();
            let target = if path.is_empty() { &mut raw } else { &mut raw[path] };
            target.as_object_mut().unwrap().remove(field);

            assert!(
                matches!(
                    Interaction::parse(&raw, &Unresolved),
                    Err(Error::MalformedInteraction(_))
                ),
                "{}.{} should be required",
                path,
                field
            );
        }
    }

    #[test]
    fn test_value_type_mismatch() {
        let mut raw = payload();
        raw["data"]["options"] = json!([{"type": 4, "name": "uses", "value": "three"}]);

        assert!(matches!(
            Interaction::parse(&raw, &Unresolved),
            Err(Error::MalformedInteraction(_))
        ));
    }

    #[test]
    fn test_unknown_option_type() {
        let mut raw = payload();
        raw["data"]["options"] = json!([{"type": 77, "name": "what", "value": 1}]);

        assert!(matches!(
            Interaction::parse(&raw, &Unresolved),
            Err(Error::UnknownOptionType(77))
        ));
    }

    #[test]
    fn test_unknown_interaction_type() {
        let mut raw = payload();
        raw["type"] = json!(42);

        match Interaction::parse(&raw, &Unresolved) {
            Err(Error::MalformedInteraction(msg)) => assert!(msg.contains("42")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dm_invocation() {
        let mut raw = payload();
        let object = raw.as_object_mut().unwrap();
        object.remove("member");
        object.remove("guild_id");
        object.insert(
            "user".to_owned(),
            json!({"id": "7", "username": "dm-user", "avatar": null}),
        );

        let interaction = Interaction::parse(&raw, &resolver).unwrap();
        assert!(interaction.guild().is_none());
        assert!(interaction.member().is_none());
        assert_eq!(interaction.invoker().unwrap().id, Snowflake(7));
    }

    struct RejectingFactory;

    impl MemberFactory for RejectingFactory {
        fn build(&self, _: &Value, _: Option<Snowflake>, _: Option<&Guild>) -> Result<Member> {
            Err(malformed("member rejected"))
        }
    }

    #[test]
    fn test_member_factory_error_propagates() {
        let res = Interaction::parse_with(&payload(), &Unresolved, &RejectingFactory);
        assert!(matches!(res, Err(Error::MalformedInteraction(_))));
    }

    #[test]
    fn test_options_serialize_back() {
        let interaction = Interaction::parse(&payload(), &Unresolved).unwrap();
        let wire = serde_json::to_value(interaction.options()).unwrap();

        assert_eq!(wire[0]["options"][0]["options"][4]["value"], json!("53908232506183680"));
        assert!(wire[0].get("value").is_none());
    }
}
