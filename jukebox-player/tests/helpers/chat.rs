//! Chat surface that records every call

use async_trait::async_trait;
use jukebox_common::{MessageId, SessionId, UserId};
use jukebox_player::control::{ChatSurface, ControlReaction};
use jukebox_player::presentation::NowPlayingCard;
use jukebox_player::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct PostedCard {
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub card: NowPlayingCard,
}

#[derive(Default)]
pub struct RecordingChat {
    next_id: AtomicU64,
    pub posts: Mutex<Vec<PostedCard>>,
    pub added: Mutex<Vec<(MessageId, ControlReaction)>>,
    pub cleared: Mutex<Vec<(MessageId, ControlReaction, UserId)>>,
    pub announcements: Mutex<Vec<(SessionId, String)>>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(100),
            ..Default::default()
        }
    }

    pub fn posts(&self) -> Vec<PostedCard> {
        self.posts.lock().unwrap().clone()
    }

    /// Latest display posted for a session
    pub fn last_post(&self, session_id: SessionId) -> Option<PostedCard> {
        self.posts()
            .into_iter()
            .rev()
            .find(|p| p.session_id == session_id)
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn cleared(&self) -> Vec<(MessageId, ControlReaction, UserId)> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSurface for RecordingChat {
    async fn post_now_playing(
        &self,
        session_id: SessionId,
        card: &NowPlayingCard,
    ) -> Result<MessageId> {
        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.posts.lock().unwrap().push(PostedCard {
            session_id,
            message_id,
            card: card.clone(),
        });
        Ok(message_id)
    }

    async fn add_reaction(&self, message_id: MessageId, reaction: ControlReaction) -> Result<()> {
        self.added.lock().unwrap().push((message_id, reaction));
        Ok(())
    }

    async fn clear_reaction(
        &self,
        message_id: MessageId,
        reaction: ControlReaction,
        user_id: UserId,
    ) -> Result<()> {
        self.cleared
            .lock()
            .unwrap()
            .push((message_id, reaction, user_id));
        Ok(())
    }

    async fn announce(&self, session_id: SessionId, text: &str) -> Result<()> {
        self.announcements
            .lock()
            .unwrap()
            .push((session_id, text.to_string()));
        Ok(())
    }
}
