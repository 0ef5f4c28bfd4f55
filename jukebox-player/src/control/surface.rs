//! Interactive control surface
//!
//! One task per started stream. It posts the now-playing display, attaches
//! the three control reactions and then listens for reactions on that
//! display only, translating them into controller commands.
//!
//! The surface stops listening when:
//! - the bound stream is no longer Playing/Paused,
//! - nobody reacted for `duration + grace` of playing time, or
//! - a skip or stop reaction was handled.
//!
//! Time spent paused is not charged against the timeout. Exiting only
//! detaches the display; playback is never touched by it.

use crate::control::chat::ChatSurface;
use crate::control::reactions::{ControlReaction, ReactionEvent, ReactionHub};
use crate::error::Result;
use crate::playback::{PauseToggle, StopReport, StreamStatus};
use crate::presentation::NowPlayingCard;
use crate::session::Track;
use async_trait::async_trait;
use chrono::Utc;
use jukebox_common::events::SurfaceCloseReason;
use jukebox_common::{EventBus, JukeboxEvent, MessageId, PlaybackPhase, SessionId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Commands a control surface can issue
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    async fn toggle_pause(&self) -> Result<PauseToggle>;
    async fn skip(&self) -> Result<Track>;
    async fn stop(&self) -> Result<StopReport>;
}

/// Collaborators and tunables for a surface
#[derive(Clone)]
pub struct SurfaceSettings {
    pub chat: Arc<dyn ChatSurface>,
    pub reactions: ReactionHub,
    pub events: EventBus,
    pub grace: Duration,
    pub bot_user_id: UserId,
}

/// Reaction listener bound to one stream
pub struct ControlSurface<C> {
    session_id: SessionId,
    stream_id: u64,
    track: Track,
    volume: f32,
    status: watch::Receiver<StreamStatus>,
    control: C,
    settings: SurfaceSettings,
}

impl<C: PlaybackControl> ControlSurface<C> {
    pub fn new(
        session_id: SessionId,
        stream_id: u64,
        track: Track,
        volume: f32,
        status: watch::Receiver<StreamStatus>,
        control: C,
        settings: SurfaceSettings,
    ) -> Self {
        Self {
            session_id,
            stream_id,
            track,
            volume,
            status,
            control,
            settings,
        }
    }

    /// Post, listen, and report why the surface closed
    pub async fn run(mut self) -> SurfaceCloseReason {
        // Subscribe before posting so no early reaction is missed
        let mut reactions = self.settings.reactions.subscribe();

        let card = NowPlayingCard::new(&self.track, self.volume);
        let message_id = match self
            .settings
            .chat
            .post_now_playing(self.session_id, &card)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "Could not post now-playing display");
                return SurfaceCloseReason::Unavailable;
            }
        };

        for reaction in ControlReaction::ALL {
            if let Err(e) = self.settings.chat.add_reaction(message_id, reaction).await {
                warn!(message = %message_id, %reaction, error = %e, "Could not attach reaction");
            }
        }

        let reason = self.listen(message_id, &mut reactions).await;

        info!(
            session = %self.session_id,
            stream = self.stream_id,
            message = %message_id,
            ?reason,
            "Control surface closed"
        );
        self.settings
            .events
            .emit_lossy(JukeboxEvent::ControlSurfaceClosed {
                session_id: self.session_id,
                message_id,
                reason,
                timestamp: Utc::now(),
            });

        reason
    }

    async fn listen(
        &mut self,
        message_id: MessageId,
        reactions: &mut broadcast::Receiver<ReactionEvent>,
    ) -> SurfaceCloseReason {
        let mut remaining = self.track.duration().saturating_add(self.settings.grace);
        // Set only while the stream is Playing
        let mut deadline: Option<Instant> = None;

        loop {
            let status = *self.status.borrow_and_update();
            if !status.is_live(self.stream_id) {
                return SurfaceCloseReason::StreamEnded;
            }

            match (status.phase == PlaybackPhase::Playing, deadline) {
                // Unrepresentable deadlines leave the surface open until the stream ends
                (true, None) => deadline = Instant::now().checked_add(remaining),
                (false, Some(at)) => {
                    remaining = at.saturating_duration_since(Instant::now());
                    deadline = None;
                }
                _ => {}
            }

            let timer = sleep_until(deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                _ = timer, if deadline.is_some() => {
                    debug!(session = %self.session_id, message = %message_id, "No reaction before timeout");
                    return SurfaceCloseReason::TimedOut;
                }
                changed = self.status.changed() => {
                    if changed.is_err() {
                        // Controller is gone
                        return SurfaceCloseReason::StreamEnded;
                    }
                }
                received = reactions.recv() => match received {
                    Ok(event) => {
                        if let Some(reason) = self.on_reaction(message_id, event).await {
                            return reason;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(session = %self.session_id, missed, "Reaction listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return SurfaceCloseReason::Unavailable;
                    }
                },
            }
        }
    }

    /// Handle one reaction; Some(reason) when the surface must close
    async fn on_reaction(
        &self,
        message_id: MessageId,
        event: ReactionEvent,
    ) -> Option<SurfaceCloseReason> {
        if event.message_id != message_id {
            return None;
        }
        if event.user_id == self.settings.bot_user_id {
            return None;
        }
        let Some(reaction) = ControlReaction::from_emoji(&event.emoji) else {
            debug!(message = %message_id, emoji = %event.emoji, "Ignoring unrelated reaction");
            return None;
        };

        debug!(
            session = %self.session_id,
            message = %message_id,
            user = %event.user_id,
            %reaction,
            "Control reaction"
        );

        if let Err(e) = self
            .settings
            .chat
            .clear_reaction(message_id, reaction, event.user_id)
            .await
        {
            warn!(message = %message_id, %reaction, error = %e, "Could not clear reaction");
        }

        let outcome = match reaction {
            ControlReaction::TogglePause => {
                self.control.toggle_pause().await.map(|toggle| match toggle {
                    PauseToggle::Paused => "⏸️ Paused.",
                    PauseToggle::Resumed => "▶️ Resumed.",
                })
            }
            ControlReaction::Skip => self.control.skip().await.map(|_| "⏩ Skipped."),
            ControlReaction::Stop => self
                .control
                .stop()
                .await
                .map(|_| "📛 Stopped and disconnected."),
        };
        match outcome {
            Ok(text) => self.announce(text).await,
            Err(e) => self.rejected(reaction, &e),
        }

        // Skip and stop close the surface even when the command was refused
        reaction.is_terminal().then_some(match reaction {
            ControlReaction::Stop => SurfaceCloseReason::Stop,
            _ => SurfaceCloseReason::Skip,
        })
    }

    async fn announce(&self, text: &str) {
        if let Err(e) = self.settings.chat.announce(self.session_id, text).await {
            warn!(session = %self.session_id, error = %e, "Could not post announcement");
        }
    }

    fn rejected(&self, reaction: ControlReaction, error: &crate::error::Error) {
        if error.is_benign() {
            debug!(session = %self.session_id, %reaction, %error, "Reaction had no effect");
        } else {
            warn!(session = %self.session_id, %reaction, %error, "Reaction command failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::EventChatSurface;
    use crate::error::Error;
    use std::sync::Mutex;

    /// Records calls and answers like a session with one playing stream
    #[derive(Default)]
    struct FakeControl {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl PlaybackControl for Arc<FakeControl> {
        async fn toggle_pause(&self) -> Result<PauseToggle> {
            self.calls.lock().unwrap().push("toggle");
            Ok(PauseToggle::Paused)
        }

        async fn skip(&self) -> Result<Track> {
            self.calls.lock().unwrap().push("skip");
            Err(Error::InvalidControl("Nothing to skip.".to_string()))
        }

        async fn stop(&self) -> Result<StopReport> {
            self.calls.lock().unwrap().push("stop");
            Ok(StopReport::default())
        }
    }

    fn settings(events: &EventBus, hub: &ReactionHub) -> SurfaceSettings {
        SurfaceSettings {
            chat: Arc::new(EventChatSurface::new(events.clone())),
            reactions: hub.clone(),
            events: events.clone(),
            grace: Duration::from_secs(10),
            bot_user_id: UserId(99),
        }
    }

    fn playing(stream_id: u64) -> StreamStatus {
        StreamStatus {
            stream_id: Some(stream_id),
            phase: PlaybackPhase::Playing,
        }
    }

    async fn posted_message(rx: &mut broadcast::Receiver<JukeboxEvent>) -> MessageId {
        loop {
            if let JukeboxEvent::NowPlayingPosted { message_id, .. } = rx.recv().await.unwrap() {
                return message_id;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_duration_plus_grace() {
        let events = EventBus::new(32);
        let hub = ReactionHub::default();
        let (_status_tx, status_rx) = watch::channel(playing(1));
        let control = Arc::new(FakeControl::default());

        let surface = ControlSurface::new(
            SessionId(1),
            1,
            Track::new("l", "Song", 5, "bob", "band"),
            1.0,
            status_rx,
            control.clone(),
            settings(&events, &hub),
        );

        let started = Instant::now();
        let reason = surface.run().await;
        assert_eq!(reason, SurfaceCloseReason::TimedOut);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15), "closed early: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(16), "closed late: {:?}", elapsed);
        assert!(control.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_change_closes_surface() {
        let events = EventBus::new(32);
        let hub = ReactionHub::default();
        let (status_tx, status_rx) = watch::channel(playing(3));

        let surface = ControlSurface::new(
            SessionId(1),
            3,
            Track::new("l", "Song", 300, "bob", "band"),
            1.0,
            status_rx,
            Arc::new(FakeControl::default()),
            settings(&events, &hub),
        );
        let task = tokio::spawn(surface.run());

        tokio::time::sleep(Duration::from_secs(1)).await;
        status_tx.send_replace(playing(4));

        assert_eq!(task.await.unwrap(), SurfaceCloseReason::StreamEnded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_duration_stays_open_until_stream_ends() {
        let events = EventBus::new(32);
        let hub = ReactionHub::default();
        let (status_tx, status_rx) = watch::channel(playing(1));

        let surface = ControlSurface::new(
            SessionId(1),
            1,
            Track::new("l", "Endless", u64::MAX, "bob", "band"),
            1.0,
            status_rx,
            Arc::new(FakeControl::default()),
            settings(&events, &hub),
        );
        let task = tokio::spawn(surface.run());

        tokio::time::sleep(Duration::from_secs(7 * 24 * 60 * 60)).await;
        assert!(!task.is_finished());

        status_tx.send_replace(StreamStatus {
            stream_id: None,
            phase: PlaybackPhase::Idle,
        });
        assert_eq!(task.await.unwrap(), SurfaceCloseReason::StreamEnded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_closes_even_when_rejected() {
        let events = EventBus::new(32);
        let mut rx = events.subscribe();
        let hub = ReactionHub::default();
        let (_status_tx, status_rx) = watch::channel(playing(1));
        let control = Arc::new(FakeControl::default());

        let surface = ControlSurface::new(
            SessionId(1),
            1,
            Track::new("l", "Song", 300, "bob", "band"),
            1.0,
            status_rx,
            control.clone(),
            settings(&events, &hub),
        );
        let task = tokio::spawn(surface.run());
        let message_id = posted_message(&mut rx).await;

        // Bot's own reaction and a reaction elsewhere are ignored
        hub.publish(ReactionEvent {
            message_id,
            user_id: UserId(99),
            emoji: "⏩".to_string(),
        });
        hub.publish(ReactionEvent {
            message_id: MessageId(message_id.get() + 100),
            user_id: UserId(5),
            emoji: "⏩".to_string(),
        });
        hub.publish(ReactionEvent {
            message_id,
            user_id: UserId(5),
            emoji: "⏯️".to_string(),
        });
        hub.publish(ReactionEvent {
            message_id,
            user_id: UserId(5),
            emoji: "⏩".to_string(),
        });

        assert_eq!(task.await.unwrap(), SurfaceCloseReason::Skip);
        assert_eq!(*control.calls.lock().unwrap(), vec!["toggle", "skip"]);
    }
}
