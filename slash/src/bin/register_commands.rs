use slash::commands::{CommandClient, CommandScope};
use slash::{schema, BoxError, Config, HttpTransport};

use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Overwrites the application's commands with the definitions in a JSON file.
///
/// Usage: `register-commands <definitions.json>`. Commands are registered in `SLASH_GUILD_ID` when
/// set and globally otherwise.
#[tokio::main]
pub async fn main() -> Result<(), BoxError> {
    let config = Config::load().expect("Failed to load config from environment variables");

    configure_observability(&config);

    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: register-commands <definitions.json>")?;

    let raw: Value = serde_json::from_slice(&tokio::fs::read(&path).await?)?;

    let definitions = raw
        .as_array()
        .ok_or("Definitions file must contain a JSON array")?
        .iter()
        .map(schema::parse_definition)
        .collect::<slash::Result<Vec<_>>>()?;

    info!(%path, command_count = definitions.len(), "Loaded command definitions");

    let scope = CommandScope::from(config.guild_id);
    let client = CommandClient::new(HttpTransport::new(&config)?, config.application_id);

    match client.bulk_overwrite(scope, &definitions).await {
        Ok(commands) => {
            for command in &commands {
                info!(command_id = %command.id, name = %command.name, "Registered command");
            }

            info!(?scope, "Registered {} commands", commands.len());
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to register commands");
            Err(e.into())
        }
    }
}

fn configure_observability(config: &Config) {
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    if config.json_log {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
