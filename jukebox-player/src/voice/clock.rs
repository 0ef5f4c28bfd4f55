//! Headless voice backend
//!
//! Plays nothing audible: each stream is a dedicated OS thread that runs for
//! the track's duration (scaled by `time_scale`), honours pause/resume/stop
//! and reports the outcome through the completion notifier from that thread.
//! Used when no chat platform voice transport is attached, and as the
//! reference for how a real transport hands completion back.

use crate::error::{Error, Result};
use crate::playback::{CompletionNotifier, StreamOutcome};
use crate::session::Track;
use crate::voice::{VoiceGateway, VoiceLink};
use async_trait::async_trait;
use jukebox_common::{ChannelId, SessionId};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Gateway producing [`ClockVoiceLink`]s
#[derive(Debug, Clone)]
pub struct ClockVoiceGateway {
    time_scale: f64,
}

impl ClockVoiceGateway {
    /// `time_scale` multiplies every track duration (1.0 = real time)
    pub fn new(time_scale: f64) -> Self {
        let time_scale = if time_scale.is_finite() && time_scale >= 0.0 {
            time_scale
        } else {
            warn!(time_scale, "Invalid time scale, using real time");
            1.0
        };
        Self { time_scale }
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }
}

impl Default for ClockVoiceGateway {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[async_trait]
impl VoiceGateway for ClockVoiceGateway {
    async fn connect(
        &self,
        session_id: SessionId,
        channel: ChannelId,
    ) -> Result<Box<dyn VoiceLink>> {
        info!(session = %session_id, channel = %channel, "Clock voice link connected");
        Ok(Box::new(ClockVoiceLink {
            session_id,
            channel,
            time_scale: self.time_scale,
            stream: None,
        }))
    }
}

/// Control messages for a stream thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamControl {
    Pause,
    Resume,
    Stop,
}

struct StreamWorker {
    control: mpsc::Sender<StreamControl>,
    thread: Option<JoinHandle<()>>,
}

impl StreamWorker {
    fn send(&self, msg: StreamControl) -> bool {
        self.control.send(msg).is_ok()
    }

    /// Stop without waiting for the thread
    fn detach(self) {
        let _ = self.control.send(StreamControl::Stop);
    }

    /// Stop and wait for the thread so its notifier has fired before return
    fn shutdown(mut self) {
        let _ = self.control.send(StreamControl::Stop);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("Clock stream thread panicked");
            }
        }
    }
}

/// Link whose streams are timers on dedicated threads
pub struct ClockVoiceLink {
    session_id: SessionId,
    channel: ChannelId,
    time_scale: f64,
    stream: Option<StreamWorker>,
}

impl ClockVoiceLink {
    /// Saturates at `Duration::MAX` for lengths no timer can represent
    fn scaled(&self, track: &Track) -> Duration {
        Duration::try_from_secs_f64(track.duration_seconds as f64 * self.time_scale)
            .unwrap_or(Duration::MAX)
    }

    fn control(&mut self, msg: StreamControl) -> Result<()> {
        match &self.stream {
            Some(worker) if worker.send(msg) => Ok(()),
            _ => Err(Error::Stream("no active stream".to_string())),
        }
    }
}

#[async_trait]
impl VoiceLink for ClockVoiceLink {
    fn channel(&self) -> ChannelId {
        self.channel
    }

    async fn move_to(&mut self, channel: ChannelId) -> Result<()> {
        info!(
            session = %self.session_id,
            from = %self.channel,
            to = %channel,
            "Moving clock voice link"
        );
        self.channel = channel;
        Ok(())
    }

    fn play(&mut self, track: &Track, gain: f32, done: CompletionNotifier) -> Result<()> {
        if track.locator.trim().is_empty() {
            // Dropping `done` posts Abandoned for an id that never went live
            return Err(Error::Stream(format!("'{}' has no stream locator", track.title)));
        }

        if let Some(previous) = self.stream.take() {
            // Not joined: the old thread reports Stopped on its own
            previous.detach();
        }

        let length = self.scaled(track);
        let (control, rx) = mpsc::channel();
        let title = track.title.clone();
        let session_id = self.session_id;

        debug!(session = %session_id, %title, gain, ?length, "Starting clock stream");

        let thread = thread::Builder::new()
            .name(format!("clock-stream-{}", done.stream_id()))
            .spawn(move || {
                let outcome = run_stream(length, &rx);
                debug!(session = %session_id, %title, ?outcome, "Clock stream ended");
                done.complete(outcome);
            })?;

        self.stream = Some(StreamWorker {
            control,
            thread: Some(thread),
        });
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.control(StreamControl::Pause)
    }

    fn resume(&mut self) -> Result<()> {
        self.control(StreamControl::Resume)
    }

    fn stop_stream(&mut self) {
        if let Some(worker) = &self.stream {
            let _ = worker.send(StreamControl::Stop);
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(worker) = self.stream.take() {
            let _ = worker.send(StreamControl::Stop);
            // Joining a thread must not stall the runtime
            let _ = tokio::task::spawn_blocking(move || worker.shutdown()).await;
        }
        info!(session = %self.session_id, channel = %self.channel, "Clock voice link disconnected");
        Ok(())
    }
}

/// Body of a stream thread
fn run_stream(length: Duration, rx: &mpsc::Receiver<StreamControl>) -> StreamOutcome {
    let mut remaining = length;
    let mut paused = false;

    loop {
        if paused {
            match rx.recv() {
                Ok(StreamControl::Resume) => paused = false,
                Ok(StreamControl::Pause) => {}
                Ok(StreamControl::Stop) | Err(_) => return StreamOutcome::Stopped,
            }
            continue;
        }

        let started = Instant::now();
        match rx.recv_timeout(remaining) {
            Ok(StreamControl::Pause) => {
                remaining = remaining.saturating_sub(started.elapsed());
                paused = true;
            }
            Ok(StreamControl::Resume) => {
                remaining = remaining.saturating_sub(started.elapsed());
            }
            Ok(StreamControl::Stop) | Err(RecvTimeoutError::Disconnected) => {
                return StreamOutcome::Stopped;
            }
            Err(RecvTimeoutError::Timeout) => return StreamOutcome::Finished,
        }
    }
}
