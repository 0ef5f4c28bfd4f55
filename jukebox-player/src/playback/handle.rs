//! Cloneable handle to a session's controller task

use crate::control::PlaybackControl;
use crate::error::{Error, Result};
use crate::playback::command::{
    EnqueueReceipt, PauseToggle, Reply, SessionCommand, StopReport,
};
use crate::playback::state::{SessionSnapshot, StreamStatus};
use crate::session::Track;
use async_trait::async_trait;
use jukebox_common::{ChannelId, SessionId};
use tokio::sync::{mpsc, oneshot, watch};

/// Sends commands to one session's controller and awaits the replies
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionCommand>,
    status: watch::Receiver<StreamStatus>,
}

impl SessionHandle {
    pub(crate) fn new(
        session_id: SessionId,
        tx: mpsc::UnboundedSender<SessionCommand>,
        status: watch::Receiver<StreamStatus>,
    ) -> Self {
        Self {
            session_id,
            tx,
            status,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Watch channel of the active stream and phase
    pub fn status(&self) -> watch::Receiver<StreamStatus> {
        self.status.clone()
    }

    /// Append tracks; starts playback in `channel` when the session is idle
    pub async fn enqueue(&self, tracks: Vec<Track>, channel: ChannelId) -> Result<EnqueueReceipt> {
        self.request(|reply| SessionCommand::Enqueue {
            tracks,
            channel,
            reply,
        })
        .await
    }

    /// Set volume in percent (0-200); applies from the next stream
    pub async fn set_volume(&self, percent: i64) -> Result<f32> {
        self.request(|reply| SessionCommand::SetVolume { percent, reply })
            .await
    }

    pub async fn toggle_pause(&self) -> Result<PauseToggle> {
        self.request(|reply| SessionCommand::TogglePause { reply })
            .await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Resume { reply }).await
    }

    /// End the current stream early; returns the track that was cut
    pub async fn skip(&self) -> Result<Track> {
        self.request(|reply| SessionCommand::Skip { reply }).await
    }

    /// Clear the queue, end the stream and release the voice link
    pub async fn stop(&self) -> Result<StopReport> {
        self.request(|reply| SessionCommand::Stop { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| SessionCommand::Snapshot { reply })
            .await
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> SessionCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| Error::SessionUnavailable(self.session_id))?;
        rx.await
            .map_err(|_| Error::SessionUnavailable(self.session_id))?
    }
}

#[async_trait]
impl PlaybackControl for SessionHandle {
    async fn toggle_pause(&self) -> Result<PauseToggle> {
        SessionHandle::toggle_pause(self).await
    }

    async fn skip(&self) -> Result<Track> {
        SessionHandle::skip(self).await
    }

    async fn stop(&self) -> Result<StopReport> {
        SessionHandle::stop(self).await
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("status", &*self.status.borrow())
            .finish()
    }
}
