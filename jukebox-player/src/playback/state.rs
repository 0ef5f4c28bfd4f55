//! Playback state management

use crate::session::Track;
use jukebox_common::PlaybackPhase;
use serde::Serialize;

/// Playback state of one session
///
/// Exactly one value per session at any time; only `Playing` and `Paused`
/// carry a stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Connecting,
    Playing(Track),
    Paused(Track),
    Disconnecting,
}

impl PlaybackState {
    /// Payload-free phase
    pub fn phase(&self) -> PlaybackPhase {
        match self {
            PlaybackState::Idle => PlaybackPhase::Idle,
            PlaybackState::Connecting => PlaybackPhase::Connecting,
            PlaybackState::Playing(_) => PlaybackPhase::Playing,
            PlaybackState::Paused(_) => PlaybackPhase::Paused,
            PlaybackState::Disconnecting => PlaybackPhase::Disconnecting,
        }
    }

    /// Track bound to the active stream, if any
    pub fn current_track(&self) -> Option<&Track> {
        match self {
            PlaybackState::Playing(track) | PlaybackState::Paused(track) => Some(track),
            _ => None,
        }
    }

    /// True while a stream exists
    pub fn has_stream(&self) -> bool {
        self.current_track().is_some()
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing(track) => write!(f, "playing \"{}\"", track.title),
            PlaybackState::Paused(track) => write!(f, "paused \"{}\"", track.title),
            other => write!(f, "{}", other.phase()),
        }
    }
}

/// What the control surfaces watch
///
/// Published by the controller on every state change. A surface is bound to
/// one `stream_id`; once the published id differs or the phase leaves
/// Playing/Paused, its stream is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamStatus {
    /// Active stream, if any
    pub stream_id: Option<u64>,
    /// Current phase
    pub phase: PlaybackPhase,
}

impl StreamStatus {
    /// Status of a session with no stream
    pub fn idle() -> Self {
        Self {
            stream_id: None,
            phase: PlaybackPhase::Idle,
        }
    }

    /// True if `stream_id` is still the live stream
    pub fn is_live(&self, stream_id: u64) -> bool {
        self.stream_id == Some(stream_id) && self.phase.has_stream()
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: jukebox_common::SessionId,
    pub phase: PlaybackPhase,
    /// Track bound to the active stream
    pub current: Option<Track>,
    /// Pending tracks in play order (excludes `current`)
    pub upcoming: Vec<Track>,
    /// Gain factor used for the next stream
    pub volume: f32,
    /// True while a voice link is held
    pub connected: bool,
}
