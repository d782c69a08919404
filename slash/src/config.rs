use model::channel::message::{AllowedMentions, MentionTarget, MentionType};
use model::Snowflake;
use serde::Deserialize;

/// Settings read from `SLASH_`-prefixed environment variables.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    pub application_id: Snowflake,
    pub bot_token: Option<String>,
    /// Scope for command registration. Global when unset.
    pub guild_id: Option<Snowflake>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    pub allowed_mentions_parse: Option<Vec<MentionType>>,
    pub allowed_mentions_replied_user: Option<bool>,

    #[serde(default)]
    pub json_log: bool,
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_owned()
}

fn default_http_timeout_secs() -> u64 {
    15
}

impl Config {
    pub fn load() -> Result<Config, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Config, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("SLASH_").from_iter(vars)
    }

    /// The process-wide allowed mentions policy, `None` when neither policy variable is set.
    pub fn allowed_mentions(&self) -> Option<AllowedMentions> {
        if self.allowed_mentions_parse.is_none() && self.allowed_mentions_replied_user.is_none() {
            return None;
        }

        let mut policy = AllowedMentions {
            replied_user: self.allowed_mentions_replied_user,
            ..Default::default()
        };

        if let Some(parse) = &self.allowed_mentions_parse {
            let target = |kind: MentionType| {
                if parse.contains(&kind) {
                    MentionTarget::All
                } else {
                    MentionTarget::Disabled
                }
            };

            policy.everyone = Some(parse.contains(&MentionType::Everyone));
            policy.users = Some(target(MentionType::Users));
            policy.roles = Some(target(MentionType::Roles));
        }

        Some(policy)
    }
}
