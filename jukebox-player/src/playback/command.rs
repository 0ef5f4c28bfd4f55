//! Messages consumed by a session's controller task
//!
//! Every request that reads or mutates a session (user commands, control
//! surface actions, and stream completions coming from the media context)
//! is a `SessionCommand` on the controller's channel. The controller handles
//! them one at a time, which is what serializes all mutation of a session.

use crate::error::Result;
use crate::playback::state::SessionSnapshot;
use crate::session::Track;
use jukebox_common::ChannelId;
use serde::Serialize;
use tokio::sync::oneshot;

/// One-shot reply slot
pub(crate) type Reply<T> = oneshot::Sender<Result<T>>;

/// How a stream ended, as reported by the media backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Reached end of media
    Finished,
    /// Stopped on request (skip/stop/disconnect)
    Stopped,
    /// Transport error mid-stream
    Failed(String),
    /// The backend dropped the notifier without reporting
    Abandoned,
}

/// Result of an enqueue request
#[derive(Debug, Clone, Serialize)]
pub struct EnqueueReceipt {
    /// Tracks appended, in order
    pub added: Vec<Track>,
    /// Pending tracks after the append (excludes the one playing)
    pub queue_length: usize,
    /// True when this request started playback from Idle
    pub started_playback: bool,
    /// Gain factor at the time of the request
    pub volume: f32,
}

/// Result of a pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseToggle {
    Paused,
    Resumed,
}

/// Result of a stop request
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopReport {
    /// Pending tracks dropped
    pub cleared: usize,
    /// Title of the stream that was cut, if one was active
    pub interrupted: Option<String>,
    /// True if a voice link was released
    pub disconnected: bool,
}

/// Commands handled by the controller task
pub(crate) enum SessionCommand {
    Enqueue {
        tracks: Vec<Track>,
        channel: ChannelId,
        reply: Reply<EnqueueReceipt>,
    },
    SetVolume {
        percent: i64,
        reply: Reply<f32>,
    },
    TogglePause {
        reply: Reply<PauseToggle>,
    },
    Pause {
        reply: Reply<()>,
    },
    Resume {
        reply: Reply<()>,
    },
    Skip {
        reply: Reply<Track>,
    },
    Stop {
        reply: Reply<StopReport>,
    },
    Snapshot {
        reply: Reply<SessionSnapshot>,
    },
    /// Posted by a CompletionNotifier, possibly from a non-async thread
    StreamFinished {
        stream_id: u64,
        outcome: StreamOutcome,
    },
}

impl SessionCommand {
    /// Short name for logs
    pub(crate) fn name(&self) -> &'static str {
        match self {
            SessionCommand::Enqueue { .. } => "enqueue",
            SessionCommand::SetVolume { .. } => "set_volume",
            SessionCommand::TogglePause { .. } => "toggle_pause",
            SessionCommand::Pause { .. } => "pause",
            SessionCommand::Resume { .. } => "resume",
            SessionCommand::Skip { .. } => "skip",
            SessionCommand::Stop { .. } => "stop",
            SessionCommand::Snapshot { .. } => "snapshot",
            SessionCommand::StreamFinished { .. } => "stream_finished",
        }
    }
}
