use crate::{Config, Error, Interaction, Method, Request, Result, Transport};
use model::channel::message::{AllowedMentions, Embed, Message};
use model::interaction::InteractionResponseType;
use model::Snowflake;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const MAX_EMBEDS: usize = 10;

/// Message flag that makes a response visible only to the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

/// The response types that defer the real reply. Only these may be sent without a `data` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deferral {
    /// Shows a loading state, the reply is delivered later by editing the original response.
    #[default]
    ChannelMessage,
    /// Acknowledges a component interaction without changing its message.
    MessageUpdate,
}

impl From<Deferral> for InteractionResponseType {
    fn from(deferral: Deferral) -> Self {
        match deferral {
            Deferral::ChannelMessage => InteractionResponseType::DeferredChannelMessageWithSource,
            Deferral::MessageUpdate => InteractionResponseType::DeferredMessageUpdate,
        }
    }
}

/// Contents of an initial response or a followup message.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub embeds: Option<Vec<Embed>>,
    pub allowed_mentions: Option<AllowedMentions>,
    pub tts: bool,
    pub flags: u64,
}

impl MessageOptions {
    pub fn new() -> MessageOptions {
        MessageOptions::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn embeds(mut self, embeds: Vec<Embed>) -> Self {
        self.embeds = Some(embeds);
        self
    }

    pub fn allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.flags |= EPHEMERAL;
        self
    }
}

/// A sparse patch of an already sent message. Only fields that are set end up in the request.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// `Some(None)` clears the content.
    pub content: Option<Option<String>>,
    pub embed: Option<Embed>,
    pub embeds: Option<Vec<Embed>>,
    pub allowed_mentions: Option<AllowedMentions>,
    pub flags: Option<u64>,
}

impl EditOptions {
    pub fn new() -> EditOptions {
        EditOptions::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(Some(content.to_string()));
        self
    }

    pub fn clear_content(mut self) -> Self {
        self.content = Some(None);
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn embeds(mut self, embeds: Vec<Embed>) -> Self {
        self.embeds = Some(embeds);
        self
    }

    pub fn allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.embed.is_none()
            && self.embeds.is_none()
            && self.allowed_mentions.is_none()
            && self.flags.is_none()
    }
}

/// Shapes response requests. Pure: nothing here performs I/O, so every validation error surfaces
/// before a request exists.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    application_id: Snowflake,
    allowed_mentions: Option<AllowedMentions>,
}

impl ResponseBuilder {
    pub fn new(application_id: Snowflake, allowed_mentions: Option<AllowedMentions>) -> Self {
        Self {
            application_id,
            allowed_mentions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.application_id, config.allowed_mentions())
    }

    pub fn application_id(&self) -> Snowflake {
        self.application_id
    }

    pub fn build_initial_response(
        &self,
        interaction_id: Snowflake,
        token: &str,
        kind: InteractionResponseType,
        options: &MessageOptions,
    ) -> Result<Request> {
        let data = self.message_body(options)?;

        let mut body = Map::new();
        body.insert("type".to_owned(), serde_json::to_value(kind)?);
        body.insert("data".to_owned(), Value::Object(data));

        Ok(Request::new(Method::Post, callback_path(interaction_id, token)).with_body(body.into()))
    }

    /// A bare callback carrying only the response type, deferring the real reply. Defaults to a
    /// deferred channel message.
    pub fn build_acknowledge(
        &self,
        interaction_id: Snowflake,
        token: &str,
        kind: Option<Deferral>,
    ) -> Request {
        let kind = InteractionResponseType::from(kind.unwrap_or_default());

        Request::new(Method::Post, callback_path(interaction_id, token))
            .with_body(serde_json::json!({ "type": kind }))
    }

    /// `None` when the patch carries no fields.
    pub fn build_edit_original(
        &self,
        token: &str,
        fields: &EditOptions,
    ) -> Result<Option<Request>> {
        self.build_edit(self.original_path(token), fields)
    }

    pub fn build_delete_original(&self, token: &str) -> Request {
        Request::new(Method::Delete, self.original_path(token))
    }

    pub fn build_followup_message(&self, token: &str, options: &MessageOptions) -> Result<Request> {
        let body = self.message_body(options)?;
        Ok(Request::new(Method::Post, self.webhook_path(token)).with_body(body.into()))
    }

    pub fn build_edit_followup(
        &self,
        token: &str,
        message_id: Snowflake,
        fields: &EditOptions,
    ) -> Result<Option<Request>> {
        self.build_edit(self.followup_path(token, message_id), fields)
    }

    pub fn build_delete_followup(&self, token: &str, message_id: Snowflake) -> Request {
        Request::new(Method::Delete, self.followup_path(token, message_id))
    }

    fn message_body(&self, options: &MessageOptions) -> Result<Map<String, Value>> {
        let mut body = Map::new();

        if let Some(embeds) = normalize_embeds(options.embed.as_ref(), options.embeds.as_deref())? {
            body.insert("embeds".to_owned(), serde_json::to_value(embeds)?);
        }

        if let Some(content) = &options.content {
            body.insert("content".to_owned(), Value::String(content.clone()));
        }

        body.insert("tts".to_owned(), Value::Bool(options.tts));

        let mentions = match &options.allowed_mentions {
            Some(caller) => Some(self.merge_mentions(caller)),
            None => self.allowed_mentions.clone(),
        };

        if let Some(mentions) = mentions {
            body.insert("allowed_mentions".to_owned(), serde_json::to_value(mentions)?);
        }

        if options.flags != 0 {
            body.insert("flags".to_owned(), Value::from(options.flags));
        }

        Ok(body)
    }

    fn build_edit(&self, path: String, fields: &EditOptions) -> Result<Option<Request>> {
        let mut body = Map::new();

        match &fields.content {
            Some(Some(content)) => {
                body.insert("content".to_owned(), Value::String(content.clone()));
            }
            Some(None) => {
                body.insert("content".to_owned(), Value::Null);
            }
            None => {}
        }

        if let Some(embeds) = normalize_embeds(fields.embed.as_ref(), fields.embeds.as_deref())? {
            body.insert("embeds".to_owned(), serde_json::to_value(embeds)?);
        }

        // the policy is only applied when the caller touches allowed mentions at all
        if let Some(caller) = &fields.allowed_mentions {
            let mentions = self.merge_mentions(caller);
            body.insert("allowed_mentions".to_owned(), serde_json::to_value(mentions)?);
        }

        if let Some(flags) = fields.flags {
            body.insert("flags".to_owned(), Value::from(flags));
        }

        if body.is_empty() {
            debug!("Edit has no fields, not sending");
            return Ok(None);
        }

        Ok(Some(Request::new(Method::Patch, path).with_body(body.into())))
    }

    fn merge_mentions(&self, caller: &AllowedMentions) -> AllowedMentions {
        match &self.allowed_mentions {
            Some(policy) => policy.merge(caller),
            None => caller.clone(),
        }
    }

    fn webhook_path(&self, token: &str) -> String {
        format!("/webhooks/{}/{}", self.application_id, token)
    }

    fn original_path(&self, token: &str) -> String {
        format!("{}/messages/@original", self.webhook_path(token))
    }

    fn followup_path(&self, token: &str, message_id: Snowflake) -> String {
        format!("{}/messages/{}", self.webhook_path(token), message_id)
    }
}

fn callback_path(interaction_id: Snowflake, token: &str) -> String {
    format!("/interactions/{}/{}/callback", interaction_id, token)
}

fn normalize_embeds(embed: Option<&Embed>, embeds: Option<&[Embed]>) -> Result<Option<Vec<Embed>>> {
    match (embed, embeds) {
        (Some(_), Some(_)) => {
            warn!("Rejected response with both embed and embeds set");
            Error::ConflictingEmbedArguments.into()
        }
        (None, Some(embeds)) if embeds.len() > MAX_EMBEDS => {
            warn!(embed_count = embeds.len(), "Rejected response with too many embeds");
            Error::TooManyEmbeds(embeds.len()).into()
        }
        (None, Some(embeds)) => Ok(Some(embeds.to_vec())),
        (Some(embed), None) => Ok(Some(vec![embed.clone()])),
        (None, None) => Ok(None),
    }
}

/// Sends the responses for one interaction through a [`Transport`].
pub struct Responder<T: Transport> {
    transport: T,
    builder: ResponseBuilder,
    interaction_id: Snowflake,
    token: Box<str>,
}

impl<T: Transport> Responder<T> {
    /// Webhook calls use the interaction's own application id when the payload carried one.
    pub fn new(transport: T, builder: ResponseBuilder, interaction: &Interaction) -> Self {
        let builder = ResponseBuilder {
            application_id: interaction
                .application_id()
                .unwrap_or(builder.application_id),
            ..builder
        };

        Self {
            transport,
            builder,
            interaction_id: interaction.id(),
            token: Box::from(interaction.token()),
        }
    }

    pub fn builder(&self) -> &ResponseBuilder {
        &self.builder
    }

    #[tracing::instrument(skip(self, options), fields(interaction_id = %self.interaction_id))]
    pub async fn respond(
        &self,
        kind: InteractionResponseType,
        options: &MessageOptions,
    ) -> Result<()> {
        let request = self
            .builder
            .build_initial_response(self.interaction_id, &self.token, kind, options)?;

        self.dispatch(request).await?;
        Ok(())
    }

    /// Replies with a channel message.
    pub async fn send(&self, options: &MessageOptions) -> Result<()> {
        self.respond(InteractionResponseType::ChannelMessageWithSource, options)
            .await
    }

    /// Defers the response, `kind` defaults to a deferred channel message.
    #[tracing::instrument(skip(self), fields(interaction_id = %self.interaction_id))]
    pub async fn acknowledge(&self, kind: Option<Deferral>) -> Result<()> {
        let request = self
            .builder
            .build_acknowledge(self.interaction_id, &self.token, kind);

        self.dispatch(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, edit), fields(interaction_id = %self.interaction_id))]
    pub async fn edit_original(&self, edit: &EditOptions) -> Result<Option<Message>> {
        match self.builder.build_edit_original(&self.token, edit)? {
            Some(request) => self.dispatch_message(request).await,
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self), fields(interaction_id = %self.interaction_id))]
    pub async fn delete_original(&self) -> Result<()> {
        let request = self.builder.build_delete_original(&self.token);

        self.dispatch(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, options), fields(interaction_id = %self.interaction_id))]
    pub async fn send_followup(&self, options: &MessageOptions) -> Result<Message> {
        let request = self.builder.build_followup_message(&self.token, options)?;

        match self.dispatch_message(request).await? {
            Some(message) => {
                debug!(message_id = %message.id, "Sent followup message");
                Ok(message)
            }
            None => Error::EmptyResponse("followup message").into(),
        }
    }

    #[tracing::instrument(skip(self, edit), fields(interaction_id = %self.interaction_id))]
    pub async fn edit_followup(
        &self,
        message_id: Snowflake,
        edit: &EditOptions,
    ) -> Result<Option<Message>> {
        match self
            .builder
            .build_edit_followup(&self.token, message_id, edit)?
        {
            Some(request) => self.dispatch_message(request).await,
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self), fields(interaction_id = %self.interaction_id))]
    pub async fn delete_followup(&self, message_id: Snowflake) -> Result<()> {
        let request = self.builder.build_delete_followup(&self.token, message_id);

        self.dispatch(request).await?;
        Ok(())
    }

    async fn dispatch(&self, request: Request) -> Result<Option<Value>> {
        debug!(method = %request.method, "Sending interaction response");

        self.transport
            .send(request)
            .await
            .map_err(Error::TransportError)
    }

    async fn dispatch_message(&self, request: Request) -> Result<Option<Message>> {
        match self.dispatch(request).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }
}
