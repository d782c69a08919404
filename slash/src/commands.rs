use crate::{schema, Error, Method, Request, Result, Transport};
use model::interaction::{ApplicationCommand, CommandDefinition};
use model::Snowflake;
use serde_json::Value;
use tracing::{debug, info};

/// Where a command is registered. Guild commands update instantly, global ones propagate slowly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    Guild(Snowflake),
}

impl CommandScope {
    pub fn of(command: &ApplicationCommand) -> CommandScope {
        match command.guild_id {
            Some(guild_id) => CommandScope::Guild(guild_id),
            None => CommandScope::Global,
        }
    }
}

impl From<Option<Snowflake>> for CommandScope {
    fn from(guild_id: Option<Snowflake>) -> Self {
        match guild_id {
            Some(guild_id) => CommandScope::Guild(guild_id),
            None => CommandScope::Global,
        }
    }
}

pub fn commands_path(application_id: Snowflake, scope: CommandScope) -> String {
    match scope {
        CommandScope::Global => format!("/applications/{}/commands", application_id),
        CommandScope::Guild(guild_id) => format!(
            "/applications/{}/guilds/{}/commands",
            application_id, guild_id
        ),
    }
}

pub fn command_path(
    application_id: Snowflake,
    scope: CommandScope,
    command_id: Snowflake,
) -> String {
    format!("{}/{}", commands_path(application_id, scope), command_id)
}

pub fn build_list(application_id: Snowflake, scope: CommandScope) -> Request {
    Request::new(Method::Get, commands_path(application_id, scope))
}

pub fn build_create(
    application_id: Snowflake,
    scope: CommandScope,
    definition: &CommandDefinition,
) -> Result<Request> {
    Ok(Request::new(Method::Post, commands_path(application_id, scope))
        .with_body(serde_json::to_value(definition)?))
}

/// Edits `command` in whichever scope it was registered in.
pub fn build_edit(command: &ApplicationCommand, definition: &CommandDefinition) -> Result<Request> {
    let path = command_path(command.application_id, CommandScope::of(command), command.id);
    Ok(Request::new(Method::Patch, path).with_body(serde_json::to_value(definition)?))
}

pub fn build_delete(command: &ApplicationCommand) -> Request {
    let path = command_path(command.application_id, CommandScope::of(command), command.id);
    Request::new(Method::Delete, path)
}

pub fn build_bulk_overwrite(
    application_id: Snowflake,
    scope: CommandScope,
    definitions: &[CommandDefinition],
) -> Result<Request> {
    Ok(Request::new(Method::Put, commands_path(application_id, scope))
        .with_body(serde_json::to_value(definitions)?))
}

/// Manages the application's registered commands. Every command the platform returns is
/// validated through [`schema::parse`].
pub struct CommandClient<T: Transport> {
    transport: T,
    application_id: Snowflake,
}

impl<T: Transport> CommandClient<T> {
    pub fn new(transport: T, application_id: Snowflake) -> Self {
        Self {
            transport,
            application_id,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, scope: CommandScope) -> Result<Vec<ApplicationCommand>> {
        let body = self.send(build_list(self.application_id, scope)).await?;
        let commands = parse_commands(body, "command list")?;

        debug!(command_count = commands.len(), "Fetched commands");
        Ok(commands)
    }

    #[tracing::instrument(skip(self, definition), fields(command = %definition.name))]
    pub async fn create(
        &self,
        scope: CommandScope,
        definition: &CommandDefinition,
    ) -> Result<ApplicationCommand> {
        let request = build_create(self.application_id, scope, definition)?;
        let command = parse_command(self.send(request).await?, "created command")?;

        info!(command_id = %command.id, "Created command");
        Ok(command)
    }

    #[tracing::instrument(skip(self, command, definition), fields(command_id = %command.id))]
    pub async fn edit(
        &self,
        command: &ApplicationCommand,
        definition: &CommandDefinition,
    ) -> Result<ApplicationCommand> {
        let request = build_edit(command, definition)?;
        parse_command(self.send(request).await?, "edited command")
    }

    #[tracing::instrument(skip(self, command), fields(command_id = %command.id))]
    pub async fn delete(&self, command: &ApplicationCommand) -> Result<()> {
        self.send(build_delete(command)).await?;

        info!("Deleted command");
        Ok(())
    }

    /// Replaces every command in `scope` with `definitions`.
    #[tracing::instrument(skip(self, definitions), fields(command_count = definitions.len()))]
    pub async fn bulk_overwrite(
        &self,
        scope: CommandScope,
        definitions: &[CommandDefinition],
    ) -> Result<Vec<ApplicationCommand>> {
        let request = build_bulk_overwrite(self.application_id, scope, definitions)?;
        parse_commands(self.send(request).await?, "overwritten commands")
    }

    async fn send(&self, request: Request) -> Result<Option<Value>> {
        self.transport
            .send(request)
            .await
            .map_err(Error::TransportError)
    }
}

fn parse_command(body: Option<Value>, what: &'static str) -> Result<ApplicationCommand> {
    match body {
        Some(raw) => schema::parse(&raw),
        None => Error::EmptyResponse(what).into(),
    }
}

fn parse_commands(body: Option<Value>, what: &'static str) -> Result<Vec<ApplicationCommand>> {
    let raw = match body {
        Some(raw) => raw,
        None => return Error::EmptyResponse(what).into(),
    };

    raw.as_array()
        .ok_or_else(|| Error::SchemaError(format!("{} is not an array", what)))?
        .iter()
        .map(schema::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        requests: Mutex<Vec<Request>>,
        reply: Option<Value>,
    }

    impl Recorder {
        fn new(reply: Option<Value>) -> Arc<Recorder> {
            Arc::new(Recorder {
                requests: Mutex::new(Vec::new()),
                reply,
            })
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: Request) -> std::result::Result<Option<Value>, BoxError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    fn command(guild_id: Option<&str>) -> Value {
        let mut raw = json!({
            "id": "11",
            "application_id": "22",
            "name": "close",
            "description": "Close the ticket",
            "version": "1"
        });

        if let Some(guild_id) = guild_id {
            raw["guild_id"] = json!(guild_id);
        }

        raw
    }

    fn definition() -> CommandDefinition {
        schema::parse_definition(&json!({"name": "close", "description": "Close the ticket"}))
            .unwrap()
    }

    #[test]
    fn test_paths_by_scope() {
        assert_eq!(
            commands_path(Snowflake(1), CommandScope::Global),
            "/applications/1/commands"
        );
        assert_eq!(
            command_path(Snowflake(1), CommandScope::Guild(Snowflake(2)), Snowflake(3)),
            "/applications/1/guilds/2/commands/3"
        );
    }

    #[test]
    fn test_edit_and_delete_follow_command_scope() {
        let global = schema::parse(&command(None)).unwrap();
        let guild = schema::parse(&command(Some("33"))).unwrap();

        let request = build_edit(&global, &definition()).unwrap();
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.path, "/applications/22/commands/11");

        let request = build_delete(&guild);
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.path, "/applications/22/guilds/33/commands/11");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_bulk_overwrite_body() {
        let request =
            build_bulk_overwrite(Snowflake(22), CommandScope::Global, &[definition()]).unwrap();

        assert_eq!(request.method, Method::Put);
        assert_eq!(
            request.body.unwrap(),
            json!([{"name": "close", "description": "Close the ticket"}])
        );
    }

    #[tokio::test]
    async fn test_create_parses_response() {
        let transport = Recorder::new(Some(command(Some("33"))));
        let client = CommandClient::new(transport.clone(), Snowflake(22));

        let created = client
            .create(CommandScope::Guild(Snowflake(33)), &definition())
            .await
            .unwrap();

        assert_eq!(created.id, Snowflake(11));
        assert!(!created.is_global());

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].path, "/applications/22/guilds/33/commands");
    }

    #[tokio::test]
    async fn test_list_rejects_invalid_command() {
        let mut bad = command(None);
        bad.as_object_mut().unwrap().remove("description");

        let transport = Recorder::new(Some(json!([command(None), bad])));
        let client = CommandClient::new(transport, Snowflake(22));

        assert!(matches!(
            client.list(CommandScope::Global).await,
            Err(Error::SchemaError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_without_body() {
        let transport = Recorder::new(None);
        let client = CommandClient::new(transport.clone(), Snowflake(22));
        let global = schema::parse(&command(None)).unwrap();

        client.delete(&global).await.unwrap();
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_overwrite_requires_body() {
        let client = CommandClient::new(Recorder::new(None), Snowflake(22));

        assert!(matches!(
            client
                .bulk_overwrite(CommandScope::Global, &[definition()])
                .await,
            Err(Error::EmptyResponse(_))
        ));
    }
}
