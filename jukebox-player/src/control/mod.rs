//! Reaction-driven control of the playing track

pub mod chat;
pub mod reactions;
pub mod surface;

pub use chat::{ChatSurface, EventChatSurface};
pub use reactions::{ControlReaction, ReactionEvent, ReactionHub};
pub use surface::{ControlSurface, PlaybackControl, SurfaceSettings};
