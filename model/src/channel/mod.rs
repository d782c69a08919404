mod channel;
pub use channel::Channel;

mod channel_type;
pub use channel_type::ChannelType;

pub mod message;
