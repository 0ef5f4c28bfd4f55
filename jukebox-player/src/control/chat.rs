//! Chat surface: where now-playing displays and short feedback lines go

use crate::control::reactions::ControlReaction;
use crate::error::Result;
use crate::presentation::NowPlayingCard;
use async_trait::async_trait;
use chrono::Utc;
use jukebox_common::{EventBus, JukeboxEvent, MessageId, SessionId, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Outbound operations on the session's text channel
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Post the now-playing display; its id scopes the control reactions
    async fn post_now_playing(&self, session_id: SessionId, card: &NowPlayingCard)
        -> Result<MessageId>;

    /// Attach a control affordance to a posted message
    async fn add_reaction(&self, message_id: MessageId, reaction: ControlReaction) -> Result<()>;

    /// Remove `user_id`'s reaction so the control can be used again
    async fn clear_reaction(
        &self,
        message_id: MessageId,
        reaction: ControlReaction,
        user_id: UserId,
    ) -> Result<()>;

    /// Post a short feedback line
    async fn announce(&self, session_id: SessionId, text: &str) -> Result<()>;
}

/// Chat surface that publishes displays as [`JukeboxEvent`]s
///
/// Clients following the SSE stream render `NowPlayingPosted` and send
/// reactions back through the reactions endpoint. Reactions live on the
/// client, so attaching and clearing them only logs.
pub struct EventChatSurface {
    events: EventBus,
    next_message: AtomicU64,
}

impl EventChatSurface {
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            next_message: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ChatSurface for EventChatSurface {
    async fn post_now_playing(
        &self,
        session_id: SessionId,
        card: &NowPlayingCard,
    ) -> Result<MessageId> {
        let message_id = MessageId(self.next_message.fetch_add(1, Ordering::Relaxed));

        self.events.emit_lossy(JukeboxEvent::NowPlayingPosted {
            session_id,
            message_id,
            title: card.title.clone(),
            uploader: card.uploader.clone(),
            requester: card.requester.clone(),
            duration: card.duration.clone(),
            volume_percent: card.volume_percent,
            timestamp: Utc::now(),
        });

        Ok(message_id)
    }

    async fn add_reaction(&self, message_id: MessageId, reaction: ControlReaction) -> Result<()> {
        debug!(message = %message_id, %reaction, "Reaction attached");
        Ok(())
    }

    async fn clear_reaction(
        &self,
        message_id: MessageId,
        reaction: ControlReaction,
        user_id: UserId,
    ) -> Result<()> {
        debug!(message = %message_id, %reaction, user = %user_id, "Reaction cleared");
        Ok(())
    }

    async fn announce(&self, session_id: SessionId, text: &str) -> Result<()> {
        self.events.emit_lossy(JukeboxEvent::Announcement {
            session_id,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
