//! Stream completion signal
//!
//! Media backends run their pipelines outside the async runtime and report
//! the end of a stream from there. They never touch session state: the
//! notifier only posts a `StreamFinished` command onto the owning
//! controller's channel, and the controller reacts on its own task.
//!
//! The notifier fires exactly once. `complete` consumes it, and dropping it
//! unfired posts `StreamOutcome::Abandoned`, so a backend thread that panics
//! or forgets to report still moves the session forward.

use crate::playback::command::{SessionCommand, StreamOutcome};
use jukebox_common::SessionId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One-shot completion handle for a single stream
pub struct CompletionNotifier {
    session_id: SessionId,
    stream_id: u64,
    tx: Option<mpsc::UnboundedSender<SessionCommand>>,
}

impl CompletionNotifier {
    pub(crate) fn new(
        session_id: SessionId,
        stream_id: u64,
        tx: mpsc::UnboundedSender<SessionCommand>,
    ) -> Self {
        Self {
            session_id,
            stream_id,
            tx: Some(tx),
        }
    }

    /// Stream this notifier belongs to
    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    /// Session this notifier belongs to
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Report how the stream ended. Safe to call from any thread.
    pub fn complete(mut self, outcome: StreamOutcome) {
        self.post(outcome);
    }

    fn post(&mut self, outcome: StreamOutcome) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        debug!(
            session = %self.session_id,
            stream = self.stream_id,
            ?outcome,
            "Posting stream completion"
        );

        if tx
            .send(SessionCommand::StreamFinished {
                stream_id: self.stream_id,
                outcome,
            })
            .is_err()
        {
            // Only happens during shutdown
            debug!(session = %self.session_id, "Controller gone, completion dropped");
        }
    }
}

impl Drop for CompletionNotifier {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!(
                session = %self.session_id,
                stream = self.stream_id,
                "Stream ended without reporting completion"
            );
            self.post(StreamOutcome::Abandoned);
        }
    }
}

impl std::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionNotifier")
            .field("session_id", &self.session_id)
            .field("stream_id", &self.stream_id)
            .field("fired", &self.tx.is_none())
            .finish()
    }
}
