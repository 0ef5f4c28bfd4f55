//! Command facade
//!
//! Entry point for every user command (play, volume, skip, pause, resume,
//! stop, queue). It does the parts that happen before a session is touched
//! (voice-channel check, catalog classification, resolution) and then hands
//! over to the session's controller.

use crate::control::ReactionEvent;
use crate::error::{Error, Result};
use crate::playback::{SessionSnapshot, StopReport};
use crate::presentation::{EnqueueSummary, QueueListing};
use crate::resolve::{resolve_batch, CatalogExpander, CatalogLink, TrackResolver};
use crate::session::{SessionRegistry, DEFAULT_VOLUME};
use jukebox_common::events::PlaybackPhase;
use jukebox_common::human_time::volume_to_percent;
use jukebox_common::{ChannelId, EventBus, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A play command as received from a chat front-end
#[derive(Debug, Clone, Deserialize)]
pub struct PlayRequest {
    pub session_id: SessionId,
    /// Voice channel the requester is in, if any
    pub channel_id: Option<ChannelId>,
    /// Display name of the requester
    pub requester: String,
    /// Text query, URL or catalog link
    pub query: String,
}

/// Result of a successful play command
#[derive(Debug, Clone, Serialize)]
pub struct PlayOutcome {
    pub summary: EnqueueSummary,
    pub started_playback: bool,
    pub queue_length: usize,
}

/// Shared command facade
#[derive(Clone)]
pub struct Jukebox {
    registry: SessionRegistry,
    resolver: Arc<dyn TrackResolver>,
    catalog: Arc<dyn CatalogExpander>,
    concurrency: usize,
}

impl Jukebox {
    pub fn new(
        registry: SessionRegistry,
        resolver: Arc<dyn TrackResolver>,
        catalog: Arc<dyn CatalogExpander>,
        concurrency: usize,
    ) -> Self {
        Self {
            registry,
            resolver,
            catalog,
            concurrency: concurrency.max(1),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn events(&self) -> &EventBus {
        &self.registry.services().events
    }

    /// Resolve the query into 1..N tracks and enqueue them
    pub async fn play(&self, request: PlayRequest) -> Result<PlayOutcome> {
        let channel = request.channel_id.ok_or(Error::NotInVoiceChannel)?;
        let query = request.query.trim();
        if query.is_empty() {
            return Err(Error::NothingFound(String::new()));
        }

        let queries = match CatalogLink::parse(query)? {
            None => vec![query.to_string()],
            Some(link) => {
                let queries = self.catalog.expand(&link).await?;
                if queries.is_empty() {
                    return Err(Error::CatalogLink(format!("{link} has no tracks")));
                }
                debug!(%link, count = queries.len(), "Catalog link expanded");
                queries
            }
        };

        let tracks = resolve_batch(
            self.resolver.as_ref(),
            &queries,
            &request.requester,
            self.concurrency,
        )
        .await;
        if tracks.is_empty() {
            return Err(Error::NothingFound(query.to_string()));
        }

        info!(
            session = %request.session_id,
            requester = %request.requester,
            resolved = tracks.len(),
            requested = queries.len(),
            "Play request resolved"
        );

        let handle = self.registry.get_or_create(request.session_id).await;
        let receipt = handle.enqueue(tracks, channel).await?;

        let summary = EnqueueSummary::new(&receipt.added, receipt.started_playback, receipt.volume)
            .ok_or_else(|| Error::Internal("enqueue accepted no tracks".to_string()))?;

        Ok(PlayOutcome {
            summary,
            started_playback: receipt.started_playback,
            queue_length: receipt.queue_length,
        })
    }

    /// Set session volume in percent; returns the accepted percentage
    ///
    /// Creates the session so the volume holds for its first track.
    pub async fn volume(&self, session_id: SessionId, percent: i64) -> Result<u32> {
        let handle = self.registry.get_or_create(session_id).await;
        let volume = handle.set_volume(percent).await?;
        Ok(volume_to_percent(volume))
    }

    pub async fn skip(&self, session_id: SessionId) -> Result<String> {
        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| Error::InvalidControl("Nothing to skip.".to_string()))?;
        Ok(handle.skip().await?.title)
    }

    pub async fn pause(&self, session_id: SessionId) -> Result<()> {
        match self.registry.get(session_id).await {
            Some(handle) => handle.pause().await,
            None => Err(Error::InvalidControl("Nothing to pause.".to_string())),
        }
    }

    pub async fn resume(&self, session_id: SessionId) -> Result<()> {
        match self.registry.get(session_id).await {
            Some(handle) => handle.resume().await,
            None => Err(Error::InvalidControl("Nothing to resume.".to_string())),
        }
    }

    /// Idempotent; a session that never existed reports nothing stopped
    pub async fn stop(&self, session_id: SessionId) -> Result<StopReport> {
        match self.registry.get(session_id).await {
            Some(handle) => handle.stop().await,
            None => Ok(StopReport::default()),
        }
    }

    /// Pending tracks, excluding the one playing
    pub async fn queue(&self, session_id: SessionId) -> Result<QueueListing> {
        let snapshot = self.state(session_id).await?;
        if snapshot.upcoming.is_empty() {
            return Err(Error::EmptyQueue);
        }
        Ok(QueueListing::new(&snapshot.upcoming))
    }

    /// Current state; sessions that never existed read as idle
    pub async fn state(&self, session_id: SessionId) -> Result<SessionSnapshot> {
        match self.registry.get(session_id).await {
            Some(handle) => handle.snapshot().await,
            None => Ok(SessionSnapshot {
                session_id,
                phase: PlaybackPhase::Idle,
                current: None,
                upcoming: Vec::new(),
                volume: DEFAULT_VOLUME,
                connected: false,
            }),
        }
    }

    /// Deliver a reaction to the live control surfaces
    pub fn react(&self, event: ReactionEvent) -> usize {
        self.registry.services().reactions.publish(event)
    }
}
