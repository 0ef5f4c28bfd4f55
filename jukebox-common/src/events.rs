//! Event types for the jukebox event system
//!
//! Provides the shared event definitions and the EventBus used by the
//! playback controllers, the control surfaces and the SSE endpoint.

use crate::ids::{MessageId, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Coarse playback phase of a session
///
/// The player crate carries the current track inside its own state type;
/// this payload-free mirror is what gets serialized and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// No voice link, nothing playing
    Idle,
    /// Acquiring or moving the voice link
    Connecting,
    /// A stream is running
    Playing,
    /// A stream is held
    Paused,
    /// Releasing the voice link
    Disconnecting,
}

impl PlaybackPhase {
    /// True while a stream exists (Playing or Paused)
    pub fn has_stream(self) -> bool {
        matches!(self, PlaybackPhase::Playing | PlaybackPhase::Paused)
    }
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaybackPhase::Idle => "idle",
            PlaybackPhase::Connecting => "connecting",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Paused => "paused",
            PlaybackPhase::Disconnecting => "disconnecting",
        };
        f.write_str(name)
    }
}

/// Why a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Reached end of media
    Finished,
    /// Ended early by a skip
    Skipped,
    /// Ended by stop
    Stopped,
    /// Media transport failed (or never reported)
    Failed,
}

/// Why a control surface stopped listening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceCloseReason {
    /// The bound stream left Playing/Paused
    StreamEnded,
    /// Nobody reacted within duration + grace
    TimedOut,
    /// A skip reaction was processed
    Skip,
    /// A stop reaction was processed
    Stop,
    /// The display could not be posted or an event source closed
    Unavailable,
}

/// Jukebox event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JukeboxEvent {
    /// Playback phase of a session changed
    PlaybackStateChanged {
        session_id: SessionId,
        old_state: PlaybackPhase,
        new_state: PlaybackPhase,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stream started for a track
    TrackStarted {
        session_id: SessionId,
        title: String,
        duration_seconds: u64,
        requester: String,
        uploader: String,
        /// Gain factor applied to this stream (1.0 = 100%)
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stream ended, for any reason
    TrackCompleted {
        session_id: SessionId,
        title: String,
        reason: CompletionReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Tracks were appended to a session queue
    TracksEnqueued {
        session_id: SessionId,
        titles: Vec<String>,
        queue_length: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue emptied by stop
    QueueCleared {
        session_id: SessionId,
        removed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session volume changed (applies from the next stream)
    VolumeChanged {
        session_id: SessionId,
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A now-playing display was posted
    ///
    /// Clients react to `message_id` to drive the control surface.
    NowPlayingPosted {
        session_id: SessionId,
        message_id: MessageId,
        title: String,
        uploader: String,
        requester: String,
        duration: String,
        volume_percent: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A control surface stopped listening
    ControlSurfaceClosed {
        session_id: SessionId,
        message_id: MessageId,
        reason: SurfaceCloseReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Short feedback line for the session's text channel
    Announcement {
        session_id: SessionId,
        text: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl JukeboxEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            JukeboxEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            JukeboxEvent::TrackStarted { .. } => "TrackStarted",
            JukeboxEvent::TrackCompleted { .. } => "TrackCompleted",
            JukeboxEvent::TracksEnqueued { .. } => "TracksEnqueued",
            JukeboxEvent::QueueCleared { .. } => "QueueCleared",
            JukeboxEvent::VolumeChanged { .. } => "VolumeChanged",
            JukeboxEvent::NowPlayingPosted { .. } => "NowPlayingPosted",
            JukeboxEvent::ControlSurfaceClosed { .. } => "ControlSurfaceClosed",
            JukeboxEvent::Announcement { .. } => "Announcement",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> SessionId {
        match self {
            JukeboxEvent::PlaybackStateChanged { session_id, .. }
            | JukeboxEvent::TrackStarted { session_id, .. }
            | JukeboxEvent::TrackCompleted { session_id, .. }
            | JukeboxEvent::TracksEnqueued { session_id, .. }
            | JukeboxEvent::QueueCleared { session_id, .. }
            | JukeboxEvent::VolumeChanged { session_id, .. }
            | JukeboxEvent::NowPlayingPosted { session_id, .. }
            | JukeboxEvent::ControlSurfaceClosed { session_id, .. }
            | JukeboxEvent::Announcement { session_id, .. } => *session_id,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use jukebox_common::events::{EventBus, JukeboxEvent};
/// use jukebox_common::ids::SessionId;
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(JukeboxEvent::Announcement {
///     session_id: SessionId(1),
///     text: "Paused.".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JukeboxEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<JukeboxEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: JukeboxEvent,
    ) -> Result<usize, broadcast::error::SendError<JukeboxEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: JukeboxEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
