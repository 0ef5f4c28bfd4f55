//! Voice connection abstraction
//!
//! A [`VoiceGateway`] opens links; a [`VoiceLink`] is one live connection to
//! a voice channel through which at most one stream plays at a time. Links
//! are owned exclusively by a session's playback controller.
//!
//! Stream control calls (`play`, `pause`, `resume`, `stop_stream`) are
//! synchronous hand-offs to the media context; the end of a stream is only
//! ever reported through the [`CompletionNotifier`] passed to `play`.

pub mod clock;

pub use clock::ClockVoiceGateway;

use crate::error::Result;
use crate::playback::CompletionNotifier;
use crate::session::Track;
use async_trait::async_trait;
use jukebox_common::{ChannelId, SessionId};

/// Opens voice links
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Join `channel` on behalf of `session_id`
    ///
    /// # Returns
    /// * `Ok(link)` - Connected and ready to stream
    /// * `Err(Error::Connection)` - Channel unreachable or join refused
    async fn connect(&self, session_id: SessionId, channel: ChannelId)
        -> Result<Box<dyn VoiceLink>>;
}

/// One live voice connection
#[async_trait]
pub trait VoiceLink: Send {
    /// Channel currently joined
    fn channel(&self) -> ChannelId;

    /// Move the existing connection to another channel
    async fn move_to(&mut self, channel: ChannelId) -> Result<()>;

    /// Start streaming `track` at `gain`, replacing any current stream
    ///
    /// `done` must be completed exactly once when the stream ends for any
    /// reason. On `Err` the stream never started.
    fn play(&mut self, track: &Track, gain: f32, done: CompletionNotifier) -> Result<()>;

    /// Hold the current stream
    fn pause(&mut self) -> Result<()>;

    /// Continue a held stream
    fn resume(&mut self) -> Result<()>;

    /// End the current stream early; its notifier still fires. No-op without
    /// a stream.
    fn stop_stream(&mut self);

    /// Leave the channel, ending any stream
    async fn disconnect(&mut self) -> Result<()>;
}
