mod message;
pub use message::Message;

pub mod embed;
pub use embed::Embed;

mod allowed_mentions;
pub use allowed_mentions::{AllowedMentions, MentionTarget, MentionType};
