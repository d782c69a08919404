pub type Result<T> = std::result::Result<T, Error>;

/// Error type a [`Transport`](crate::Transport) hands back. Passed through untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid command schema: {0}")]
    SchemaError(String),

    #[error("Malformed interaction payload: {0}")]
    MalformedInteraction(String),

    #[error("Unknown application command option type {0}")]
    UnknownOptionType(u64),

    #[error("Cannot mix embed and embeds arguments")]
    ConflictingEmbedArguments,

    #[error("embeds has a maximum of 10 elements, got {0}")]
    TooManyEmbeds(usize),

    #[error("Error while performing request: {0}")]
    TransportError(#[source] BoxError),

    #[error("Expected a response body for {0}, got none")]
    EmptyResponse(&'static str),

    #[error("Error while operating on JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl<T> From<Error> for Result<T> {
    fn from(e: Error) -> Self {
        Err(e)
    }
}
