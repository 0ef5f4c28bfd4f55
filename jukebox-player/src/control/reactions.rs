//! Reaction affordances and the hub that fans reaction events out to the
//! live control surfaces

use jukebox_common::{MessageId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The three controls attached to a now-playing display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlReaction {
    TogglePause,
    Skip,
    Stop,
}

impl ControlReaction {
    /// Attach order
    pub const ALL: [ControlReaction; 3] = [
        ControlReaction::TogglePause,
        ControlReaction::Skip,
        ControlReaction::Stop,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            ControlReaction::TogglePause => "⏯️",
            ControlReaction::Skip => "⏩",
            ControlReaction::Stop => "📛",
        }
    }

    /// Map an emoji back to its control
    ///
    /// Accepts the bare codepoint as well as the variation-selector form
    /// some clients send for ⏯.
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji.trim() {
            "⏯️" | "⏯" => Some(ControlReaction::TogglePause),
            "⏩" => Some(ControlReaction::Skip),
            "📛" => Some(ControlReaction::Stop),
            _ => None,
        }
    }

    /// True for controls that end the surface once handled
    pub fn is_terminal(self) -> bool {
        matches!(self, ControlReaction::Skip | ControlReaction::Stop)
    }
}

impl std::fmt::Display for ControlReaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.emoji())
    }
}

/// A user added a reaction to a posted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
}

/// Broadcast of every incoming reaction
///
/// Each control surface subscribes and filters for its own message, so a
/// reaction never has to be routed by the caller.
#[derive(Clone)]
pub struct ReactionHub {
    tx: broadcast::Sender<ReactionEvent>,
}

impl ReactionHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReactionEvent> {
        self.tx.subscribe()
    }

    /// Deliver a reaction; returns how many surfaces were listening
    pub fn publish(&self, event: ReactionEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for ReactionHub {
    fn default() -> Self {
        Self::new(64)
    }
}
