//! Per-session playback controller
//!
//! One tokio task per session owns the session's queue, playback state and
//! voice link. Every request, including stream completions reported from the
//! media context, arrives as a [`SessionCommand`] and is handled to the end
//! before the next one is read. Nothing else ever mutates a session.
//!
//! **State machine:**
//! ```text
//! Idle --enqueue--> Connecting --link ready, head popped--> Playing
//! Playing <--toggle--> Paused
//! Playing/Paused --completion, queue non-empty--> Playing (next stream)
//! Playing/Paused --completion, queue empty--> Disconnecting --> Idle
//! any --stop--> Disconnecting --> Idle
//! ```
//!
//! Each started stream gets a fresh id. A completion is honoured only for
//! the active id, so a late signal from a stream that stop already retired
//! cannot restart anything.

use crate::control::{ChatSurface, ControlSurface, ReactionHub, SurfaceSettings};
use crate::error::{Error, Result};
use crate::playback::command::{
    EnqueueReceipt, PauseToggle, SessionCommand, StopReport, StreamOutcome,
};
use crate::playback::completion::CompletionNotifier;
use crate::playback::handle::SessionHandle;
use crate::playback::state::{PlaybackState, SessionSnapshot, StreamStatus};
use crate::session::{SessionQueue, Track};
use crate::voice::{VoiceGateway, VoiceLink};
use chrono::Utc;
use jukebox_common::events::CompletionReason;
use jukebox_common::human_time::format_volume_percent;
use jukebox_common::{ChannelId, EventBus, JukeboxEvent, SessionId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Default margin added to a track's duration before its control surface
/// stops listening
pub const DEFAULT_GRACE: Duration = Duration::from_secs(10);

/// Tunables shared by every controller
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Control surface timeout margin
    pub grace: Duration,
    /// Reactions from this user are ignored
    pub bot_user_id: UserId,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            bot_user_id: UserId(0),
        }
    }
}

/// Collaborators handed to every controller
#[derive(Clone)]
pub struct PlaybackServices {
    pub gateway: Arc<dyn VoiceGateway>,
    pub chat: Arc<dyn ChatSurface>,
    pub reactions: ReactionHub,
    pub events: EventBus,
    pub settings: ControllerSettings,
}

/// State machine driving one session
pub struct PlaybackController {
    session_id: SessionId,
    services: PlaybackServices,
    queue: SessionQueue,
    state: PlaybackState,
    link: Option<Box<dyn VoiceLink>>,

    /// Last issued stream id
    stream_seq: u64,
    /// Stream whose completion is still expected
    active_stream: Option<u64>,
    /// Why the active stream is being cut, set by skip
    pending_reason: Option<CompletionReason>,

    /// Weak so the controller does not keep its own channel open
    commands: mpsc::WeakUnboundedSender<SessionCommand>,
    status: watch::Sender<StreamStatus>,
}

impl PlaybackController {
    /// Spawn the controller task for `session_id` and return its handle
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(session_id: SessionId, services: PlaybackServices) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(StreamStatus::idle());

        let controller = Self {
            session_id,
            services,
            queue: SessionQueue::new(),
            state: PlaybackState::Idle,
            link: None,
            stream_seq: 0,
            active_stream: None,
            pending_reason: None,
            commands: tx.downgrade(),
            status,
        };

        tokio::spawn(controller.run(rx));
        SessionHandle::new(session_id, tx, status_rx)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionCommand>) {
        debug!(session = %self.session_id, "Playback controller started");

        while let Some(command) = rx.recv().await {
            debug!(session = %self.session_id, command = command.name(), "Handling command");
            self.handle(command).await;
        }

        // Every handle is gone; leave nothing connected behind
        self.stop().await;
        debug!(session = %self.session_id, "Playback controller exited");
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Enqueue {
                tracks,
                channel,
                reply,
            } => {
                let result = self.enqueue(tracks, channel).await;
                self.log_outcome("enqueue", &result);
                let _ = reply.send(result);
            }
            SessionCommand::SetVolume { percent, reply } => {
                let result = self.set_volume(percent);
                self.log_outcome("volume", &result);
                let _ = reply.send(result);
            }
            SessionCommand::TogglePause { reply } => {
                let result = match self.state {
                    PlaybackState::Playing(_) => self.pause().map(|_| PauseToggle::Paused),
                    PlaybackState::Paused(_) => self.resume().map(|_| PauseToggle::Resumed),
                    _ => Err(Error::InvalidControl("Nothing is playing.".to_string())),
                };
                self.log_outcome("toggle_pause", &result);
                let _ = reply.send(result);
            }
            SessionCommand::Pause { reply } => {
                let result = self.pause();
                self.log_outcome("pause", &result);
                let _ = reply.send(result);
            }
            SessionCommand::Resume { reply } => {
                let result = self.resume();
                self.log_outcome("resume", &result);
                let _ = reply.send(result);
            }
            SessionCommand::Skip { reply } => {
                let result = self.skip();
                self.log_outcome("skip", &result);
                let _ = reply.send(result);
            }
            SessionCommand::Stop { reply } => {
                let report = self.stop().await;
                let _ = reply.send(Ok(report));
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(self.snapshot()));
            }
            SessionCommand::StreamFinished { stream_id, outcome } => {
                self.on_stream_finished(stream_id, outcome).await;
            }
        }
    }

    // ========================================
    // Commands
    // ========================================

    async fn enqueue(&mut self, tracks: Vec<Track>, channel: ChannelId) -> Result<EnqueueReceipt> {
        let idle = matches!(self.state, PlaybackState::Idle);

        if idle {
            self.set_state(PlaybackState::Connecting);
            if let Err(e) = self.acquire_link(channel).await {
                let dropped = self.queue.clear() + tracks.len();
                warn!(
                    session = %self.session_id,
                    channel = %channel,
                    dropped,
                    error = %e,
                    "Voice connection failed, discarding request"
                );
                self.release_link().await;
                return Err(e);
            }
        } else if let Err(e) = self.acquire_link(channel).await {
            // Keep streaming where we are
            warn!(session = %self.session_id, channel = %channel, error = %e, "Could not move voice link");
        }

        let added = tracks.clone();
        self.queue.enqueue_all(tracks);

        self.services.events.emit_lossy(JukeboxEvent::TracksEnqueued {
            session_id: self.session_id,
            titles: added.iter().map(|t| t.title.clone()).collect(),
            queue_length: self.queue.len(),
            timestamp: Utc::now(),
        });

        info!(
            session = %self.session_id,
            added = added.len(),
            queue_length = self.queue.len(),
            "Tracks enqueued"
        );

        let started_playback = idle && self.start_next().await;

        Ok(EnqueueReceipt {
            added,
            queue_length: self.queue.len(),
            started_playback,
            volume: self.queue.volume(),
        })
    }

    fn set_volume(&mut self, percent: i64) -> Result<f32> {
        let volume = self.queue.set_volume_percent(percent)?;
        info!(
            session = %self.session_id,
            volume = %format_volume_percent(volume),
            "Volume set (applies to next stream)"
        );
        self.services.events.emit_lossy(JukeboxEvent::VolumeChanged {
            session_id: self.session_id,
            volume,
            timestamp: Utc::now(),
        });
        Ok(volume)
    }

    fn pause(&mut self) -> Result<()> {
        let PlaybackState::Playing(track) = &self.state else {
            return Err(Error::InvalidControl("Nothing to pause.".to_string()));
        };
        let track = track.clone();

        self.link_mut()?.pause()?;
        self.set_state(PlaybackState::Paused(track));
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let PlaybackState::Paused(track) = &self.state else {
            return Err(Error::InvalidControl("Nothing to resume.".to_string()));
        };
        let track = track.clone();

        self.link_mut()?.resume()?;
        self.set_state(PlaybackState::Playing(track));
        Ok(())
    }

    /// Cut the active stream; the completion it triggers advances the queue
    fn skip(&mut self) -> Result<Track> {
        let Some(track) = self.state.current_track().cloned() else {
            return Err(Error::InvalidControl("Nothing to skip.".to_string()));
        };

        self.pending_reason = Some(CompletionReason::Skipped);
        self.link_mut()?.stop_stream();

        info!(session = %self.session_id, title = %track.title, "Skipping track");
        Ok(track)
    }

    /// Unconditional: valid in every state, including without a link
    async fn stop(&mut self) -> StopReport {
        let cleared = self.queue.clear();
        let interrupted = self.state.current_track().map(|t| t.title.clone());

        // Retire the stream first so its completion is seen as stale
        if self.active_stream.take().is_some() {
            if let Some(link) = self.link.as_mut() {
                link.stop_stream();
            }
        }
        self.pending_reason = None;

        if let Some(title) = &interrupted {
            self.emit_completed(title, CompletionReason::Stopped);
        }
        if cleared > 0 {
            self.services.events.emit_lossy(JukeboxEvent::QueueCleared {
                session_id: self.session_id,
                removed: cleared,
                timestamp: Utc::now(),
            });
        }

        let disconnected = self.release_link().await;

        if cleared > 0 || interrupted.is_some() || disconnected {
            info!(
                session = %self.session_id,
                cleared,
                interrupted = interrupted.as_deref().unwrap_or("-"),
                disconnected,
                "Playback stopped"
            );
        }

        StopReport {
            cleared,
            interrupted,
            disconnected,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            phase: self.state.phase(),
            current: self.state.current_track().cloned(),
            upcoming: self.queue.iter().cloned().collect(),
            volume: self.queue.volume(),
            connected: self.link.is_some(),
        }
    }

    // ========================================
    // Completion
    // ========================================

    async fn on_stream_finished(&mut self, stream_id: u64, outcome: StreamOutcome) {
        if self.active_stream != Some(stream_id) {
            debug!(
                session = %self.session_id,
                stream = stream_id,
                active = ?self.active_stream,
                ?outcome,
                "Ignoring stale completion"
            );
            return;
        }
        self.active_stream = None;

        let pending = self.pending_reason.take();
        let reason = match &outcome {
            StreamOutcome::Finished => CompletionReason::Finished,
            StreamOutcome::Stopped => pending.unwrap_or(CompletionReason::Stopped),
            StreamOutcome::Failed(detail) => {
                warn!(session = %self.session_id, stream = stream_id, %detail, "Stream failed");
                CompletionReason::Failed
            }
            StreamOutcome::Abandoned => {
                warn!(session = %self.session_id, stream = stream_id, "Stream abandoned by backend");
                CompletionReason::Failed
            }
        };

        if let Some(track) = self.state.current_track().cloned() {
            info!(session = %self.session_id, title = %track.title, ?reason, "Track completed");
            self.emit_completed(&track.title, reason);
        }

        self.start_next().await;
    }

    /// Start the next playable track, or release the link when none is left
    ///
    /// Returns true if a stream started.
    async fn start_next(&mut self) -> bool {
        loop {
            let Some(track) = self.queue.advance() else {
                debug!(session = %self.session_id, "Queue exhausted");
                self.release_link().await;
                return false;
            };

            let Some(tx) = self.commands.upgrade() else {
                // Controller is shutting down
                self.queue.clear();
                self.release_link().await;
                return false;
            };

            let gain = self.queue.volume();
            self.stream_seq += 1;
            let stream_id = self.stream_seq;
            let notifier = CompletionNotifier::new(self.session_id, stream_id, tx);

            let started = match self.link.as_mut() {
                Some(link) => link.play(&track, gain, notifier),
                None => Err(Error::Connection("no voice link".to_string())),
            };

            match started {
                Ok(()) => {
                    self.active_stream = Some(stream_id);
                    self.set_state(PlaybackState::Playing(track.clone()));

                    info!(
                        session = %self.session_id,
                        stream = stream_id,
                        title = %track.title,
                        gain,
                        "Stream started"
                    );
                    self.services.events.emit_lossy(JukeboxEvent::TrackStarted {
                        session_id: self.session_id,
                        title: track.title.clone(),
                        duration_seconds: track.duration_seconds,
                        requester: track.requester_name.clone(),
                        uploader: track.uploader_name.clone(),
                        volume: gain,
                        timestamp: Utc::now(),
                    });

                    self.spawn_surface(stream_id, track, gain);
                    return true;
                }
                Err(e) => {
                    // Treated as an immediate completion
                    warn!(session = %self.session_id, title = %track.title, error = %e, "Stream failed to start");
                    self.emit_completed(&track.title, CompletionReason::Failed);
                    if self.link.is_none() {
                        self.queue.clear();
                        self.release_link().await;
                        return false;
                    }
                }
            }
        }
    }

    fn spawn_surface(&self, stream_id: u64, track: Track, gain: f32) {
        let Some(tx) = self.commands.upgrade() else {
            return;
        };
        let handle = SessionHandle::new(self.session_id, tx, self.status.subscribe());

        let surface = ControlSurface::new(
            self.session_id,
            stream_id,
            track,
            gain,
            handle.status(),
            handle,
            SurfaceSettings {
                chat: self.services.chat.clone(),
                reactions: self.services.reactions.clone(),
                events: self.services.events.clone(),
                grace: self.services.settings.grace,
                bot_user_id: self.services.settings.bot_user_id,
            },
        );
        tokio::spawn(surface.run());
    }

    // ========================================
    // Voice link
    // ========================================

    /// Reuse the held link (moving it if needed) or open a new one
    async fn acquire_link(&mut self, channel: ChannelId) -> Result<()> {
        match self.link.as_mut() {
            Some(link) if link.channel() == channel => Ok(()),
            Some(link) => link.move_to(channel).await,
            None => {
                let link = self.services.gateway.connect(self.session_id, channel).await?;
                self.link = Some(link);
                Ok(())
            }
        }
    }

    /// Disconnect if a link is held and settle in Idle
    ///
    /// Returns true if a link was released.
    async fn release_link(&mut self) -> bool {
        let released = match self.link.take() {
            Some(mut link) => {
                self.set_state(PlaybackState::Disconnecting);
                if let Err(e) = link.disconnect().await {
                    warn!(session = %self.session_id, error = %e, "Voice disconnect failed");
                }
                true
            }
            None => false,
        };
        self.set_state(PlaybackState::Idle);
        released
    }

    fn link_mut(&mut self) -> Result<&mut Box<dyn VoiceLink>> {
        self.link
            .as_mut()
            .ok_or_else(|| Error::Internal("stream without voice link".to_string()))
    }

    // ========================================
    // State and events
    // ========================================

    fn set_state(&mut self, new_state: PlaybackState) {
        let old_phase = self.state.phase();
        let new_phase = new_state.phase();
        self.state = new_state;

        if old_phase != new_phase {
            debug!(session = %self.session_id, from = %old_phase, to = %new_phase, "State transition");
            self.services.events.emit_lossy(JukeboxEvent::PlaybackStateChanged {
                session_id: self.session_id,
                old_state: old_phase,
                new_state: new_phase,
                timestamp: Utc::now(),
            });
        }

        self.status.send_replace(StreamStatus {
            stream_id: self.active_stream,
            phase: new_phase,
        });
    }

    fn emit_completed(&self, title: &str, reason: CompletionReason) {
        self.services.events.emit_lossy(JukeboxEvent::TrackCompleted {
            session_id: self.session_id,
            title: title.to_string(),
            reason,
            timestamp: Utc::now(),
        });
    }

    fn log_outcome<T>(&self, command: &str, result: &Result<T>) {
        if let Err(e) = result {
            if e.is_benign() {
                debug!(session = %self.session_id, command, error = %e, "Command rejected");
            } else {
                warn!(session = %self.session_id, command, error = %e, "Command failed");
            }
        }
    }
}
