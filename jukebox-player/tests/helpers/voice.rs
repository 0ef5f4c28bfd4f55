//! Scripted voice backend
//!
//! Streams never end on their own. Tests finish, fail or abandon the live
//! stream of a session explicitly; stop/disconnect complete it with
//! `Stopped`. Every completion is fired from a plain OS thread, the way a
//! real media pipeline reports it.

use async_trait::async_trait;
use jukebox_common::{ChannelId, SessionId};
use jukebox_player::playback::{CompletionNotifier, StreamOutcome};
use jukebox_player::session::Track;
use jukebox_player::voice::{VoiceGateway, VoiceLink};
use jukebox_player::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One successful `play` call
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    pub session_id: SessionId,
    pub stream_id: u64,
    pub title: String,
    pub gain: f32,
    pub channel: ChannelId,
}

#[derive(Default)]
pub struct VoiceLog {
    pub connects: Vec<(SessionId, ChannelId)>,
    pub moves: Vec<(SessionId, ChannelId)>,
    pub disconnects: Vec<SessionId>,
    pub plays: Vec<PlayRecord>,
    /// "pause" / "resume" per call, in order
    pub actions: Vec<String>,
    /// Live streams per session, holding their completion notifier
    live: HashMap<SessionId, CompletionNotifier>,
    /// Most live streams ever seen at once for one session
    pub max_live_per_session: usize,
    /// Sessions whose link is currently held
    pub connected: HashMap<SessionId, ChannelId>,
    pub refuse_connect: bool,
}

impl VoiceLog {
    pub fn titles(&self) -> Vec<String> {
        self.plays.iter().map(|p| p.title.clone()).collect()
    }

    pub fn is_live(&self, session_id: SessionId) -> bool {
        self.live.contains_key(&session_id)
    }
}

/// Gateway whose links record everything into a shared [`VoiceLog`]
#[derive(Clone, Default)]
pub struct ScriptedVoiceGateway {
    log: Arc<Mutex<VoiceLog>>,
}

impl ScriptedVoiceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, VoiceLog> {
        self.log.lock().unwrap()
    }

    /// Make the next connects fail
    pub fn refuse_connections(&self, refuse: bool) {
        self.log().refuse_connect = refuse;
    }

    /// End the session's live stream naturally
    pub fn finish(&self, session_id: SessionId) -> bool {
        self.complete(session_id, StreamOutcome::Finished)
    }

    /// Fail the session's live stream mid-way
    pub fn fail(&self, session_id: SessionId) -> bool {
        self.complete(session_id, StreamOutcome::Failed("transport reset".to_string()))
    }

    /// Drop the session's notifier without reporting
    pub fn abandon(&self, session_id: SessionId) -> bool {
        let notifier = self.log().live.remove(&session_id);
        match notifier {
            Some(notifier) => {
                std::thread::spawn(move || drop(notifier));
                true
            }
            None => false,
        }
    }

    fn complete(&self, session_id: SessionId, outcome: StreamOutcome) -> bool {
        let notifier = self.log().live.remove(&session_id);
        fire(notifier, outcome)
    }
}

fn fire(notifier: Option<CompletionNotifier>, outcome: StreamOutcome) -> bool {
    match notifier {
        Some(notifier) => {
            std::thread::spawn(move || notifier.complete(outcome));
            true
        }
        None => false,
    }
}

#[async_trait]
impl VoiceGateway for ScriptedVoiceGateway {
    async fn connect(
        &self,
        session_id: SessionId,
        channel: ChannelId,
    ) -> Result<Box<dyn VoiceLink>> {
        let mut log = self.log();
        if log.refuse_connect {
            return Err(Error::Connection(format!("channel {} refused", channel)));
        }
        log.connects.push((session_id, channel));
        log.connected.insert(session_id, channel);
        Ok(Box::new(ScriptedLink {
            session_id,
            channel,
            log: self.log.clone(),
        }))
    }
}

struct ScriptedLink {
    session_id: SessionId,
    channel: ChannelId,
    log: Arc<Mutex<VoiceLog>>,
}

impl ScriptedLink {
    fn log(&self) -> MutexGuard<'_, VoiceLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl VoiceLink for ScriptedLink {
    fn channel(&self) -> ChannelId {
        self.channel
    }

    async fn move_to(&mut self, channel: ChannelId) -> Result<()> {
        self.channel = channel;
        let mut log = self.log();
        log.moves.push((self.session_id, channel));
        log.connected.insert(self.session_id, channel);
        Ok(())
    }

    fn play(&mut self, track: &Track, gain: f32, done: CompletionNotifier) -> Result<()> {
        if track.locator.starts_with("fail:") {
            return Err(Error::Stream(format!("cannot open {}", track.locator)));
        }

        let mut log = self.log();
        log.plays.push(PlayRecord {
            session_id: self.session_id,
            stream_id: done.stream_id(),
            title: track.title.clone(),
            gain,
            channel: self.channel,
        });

        let live_before = usize::from(log.live.contains_key(&self.session_id));
        log.max_live_per_session = log.max_live_per_session.max(live_before + 1);
        // A still-live previous stream is replaced, as a transport would
        let previous = log.live.insert(self.session_id, done);
        drop(log);
        fire(previous, StreamOutcome::Stopped);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.log().actions.push("pause".to_string());
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.log().actions.push("resume".to_string());
        Ok(())
    }

    fn stop_stream(&mut self) {
        let notifier = self.log().live.remove(&self.session_id);
        fire(notifier, StreamOutcome::Stopped);
    }

    async fn disconnect(&mut self) -> Result<()> {
        let notifier = {
            let mut log = self.log();
            log.disconnects.push(self.session_id);
            log.connected.remove(&self.session_id);
            log.live.remove(&self.session_id)
        };
        fire(notifier, StreamOutcome::Stopped);
        Ok(())
    }
}
