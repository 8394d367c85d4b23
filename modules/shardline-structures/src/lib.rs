//! Domain structures built from gateway payloads.
//!
//! Every structure is constructed from a raw wire record: keys are renamed by
//! the field mapper, ids are normalized to `Snowflake`, and a `ClientHandle`
//! back-reference to the owning session is wired in. Business methods (REST
//! calls and the like) live elsewhere; this crate only builds values.

pub mod channel;
pub mod client;
pub mod emoji;
pub mod guild;
pub mod interaction;
pub mod member;
pub mod message;
pub mod raw;
pub mod role;
pub mod user;

pub use channel::{
    Channel, ChannelType, DmChannel, ForumChannel, GuildChannel, TextChannel, ThreadChannel,
    ThreadMember, ThreadMetadata, VoiceChannel,
};
pub use client::{Client, ClientHandle};
pub use emoji::{Emoji, Sticker};
pub use guild::Guild;
pub use interaction::Interaction;
pub use member::Member;
pub use message::Message;
pub use raw::{build_each, decode, required_snowflake, snowflake_field};
pub use role::Role;
pub use user::User;
