use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum ChannelType {
    GuildText = 0,
    DM = 1,
    GuildVoice = 2,
    GroupDM = 3,
    GuildCategory = 4,
    GuildNews = 5,
    GuildAnnouncementThread = 10,
    GuildPublicThread = 11,
    GuildPrivateThread = 12,
    GuildStageVoice = 13,
    GuildDirectory = 14,
    GuildForum = 15,
    GuildMedia = 16,
}

impl ChannelType {
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::GuildAnnouncementThread | Self::GuildPublicThread | Self::GuildPrivateThread
        )
    }

    /// Direct messages, where interactions carry `user` instead of `member`.
    pub fn is_private(self) -> bool {
        matches!(self, Self::DM | Self::GroupDM)
    }

    /// Whether followup messages can be posted in the channel.
    pub fn accepts_messages(self) -> bool {
        !matches!(
            self,
            Self::GuildCategory | Self::GuildDirectory | Self::GuildForum | Self::GuildMedia
        )
    }
}

impl TryFrom<u64> for ChannelType {
    type Error = Box<str>;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::GuildText,
            1 => Self::DM,
            2 => Self::GuildVoice,
            3 => Self::GroupDM,
            4 => Self::GuildCategory,
            5 => Self::GuildNews,
            10 => Self::GuildAnnouncementThread,
            11 => Self::GuildPublicThread,
            12 => Self::GuildPrivateThread,
            13 => Self::GuildStageVoice,
            14 => Self::GuildDirectory,
            15 => Self::GuildForum,
            16 => Self::GuildMedia,
            _ => return Err(format!("invalid channel type \"{}\"", value).into_boxed_str()),
        })
    }
}
