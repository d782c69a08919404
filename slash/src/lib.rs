mod config;
pub use config::Config;

mod error;
pub use error::{BoxError, Error, Result};

pub mod commands;
pub mod interaction;
pub mod response;
pub mod schema;
pub mod transport;

pub use interaction::{ContextResolver, Interaction, MemberFactory};
pub use response::{Deferral, EditOptions, MessageOptions, Responder, ResponseBuilder};
pub use transport::{HttpTransport, Method, Request, Transport};
