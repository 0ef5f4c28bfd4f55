//! # Jukebox Common Library
//!
//! Shared code for the jukebox service:
//! - Identifier newtypes (sessions, channels, messages, users)
//! - Event types (JukeboxEvent enum) and the EventBus
//! - Configuration file resolution and loading
//! - Human-readable time formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod ids;

pub use error::{Error, Result};
pub use events::{EventBus, JukeboxEvent, PlaybackPhase};
pub use ids::{ChannelId, MessageId, SessionId, UserId};
