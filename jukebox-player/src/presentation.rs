//! Presentation data
//!
//! Plain structures carrying what a chat front-end needs to render the
//! now-playing display, enqueue confirmations and the queue listing. They
//! serialize as-is for the HTTP API and implement `Display` as a plain-text
//! fallback.

use crate::session::Track;
use jukebox_common::human_time::{format_track_duration, volume_to_percent};
use serde::Serialize;
use std::fmt;

/// Tracks listed individually in a playlist summary
pub const SUMMARY_PREVIEW_LIMIT: usize = 10;

/// Metadata shown for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlayingCard {
    pub title: String,
    pub uploader: String,
    pub requester: String,
    /// `m:ss` (or `h:mm:ss`)
    pub duration: String,
    pub volume_percent: u32,
}

impl NowPlayingCard {
    pub fn new(track: &Track, volume: f32) -> Self {
        Self {
            title: track.title.clone(),
            uploader: track.uploader_name.clone(),
            requester: track.requester_name.clone(),
            duration: format_track_duration(track.duration_seconds),
            volume_percent: volume_to_percent(volume),
        }
    }
}

impl fmt::Display for NowPlayingCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**{}**", self.title)?;
        writeln!(f, "🎤 **{}**", self.uploader)?;
        writeln!(f, "👤 {}", self.requester)?;
        write!(f, "⏱️ {} | 🔊 {}%", self.duration, self.volume_percent)
    }
}

/// One line of a playlist summary or queue listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackLine {
    /// 1-based
    pub position: usize,
    pub title: String,
    pub duration: String,
    pub uploader: String,
    pub requester: String,
}

impl TrackLine {
    fn new(position: usize, track: &Track) -> Self {
        Self {
            position,
            title: track.title.clone(),
            duration: format_track_duration(track.duration_seconds),
            uploader: track.uploader_name.clone(),
            requester: track.requester_name.clone(),
        }
    }
}

impl fmt::Display for TrackLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. **{}** ({}) 🎤 {} 👤 {}",
            self.position, self.title, self.duration, self.uploader, self.requester
        )
    }
}

/// Confirmation for a play request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnqueueSummary {
    /// One track was added
    Single {
        /// True when the track went straight to playback
        playing: bool,
        card: NowPlayingCard,
    },
    /// Several tracks were added
    Playlist {
        total: usize,
        preview: Vec<TrackLine>,
        /// Tracks beyond the preview
        more: usize,
    },
}

impl EnqueueSummary {
    /// Summary for `added`; None when nothing was added
    pub fn new(added: &[Track], started_playback: bool, volume: f32) -> Option<Self> {
        match added {
            [] => None,
            [track] => Some(EnqueueSummary::Single {
                playing: started_playback,
                card: NowPlayingCard::new(track, volume),
            }),
            tracks => Some(EnqueueSummary::Playlist {
                total: tracks.len(),
                preview: tracks
                    .iter()
                    .take(SUMMARY_PREVIEW_LIMIT)
                    .enumerate()
                    .map(|(i, t)| TrackLine::new(i + 1, t))
                    .collect(),
                more: tracks.len().saturating_sub(SUMMARY_PREVIEW_LIMIT),
            }),
        }
    }
}

impl fmt::Display for EnqueueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnqueueSummary::Single { playing, card } => {
                let status = if *playing { "▶️ Now playing" } else { "➕ Added to queue" };
                write!(f, "{}\n{}", status, card)
            }
            EnqueueSummary::Playlist {
                total,
                preview,
                more,
            } => {
                write!(f, "📋 Playlist added ({} tracks)", total)?;
                for line in preview {
                    write!(f, "\n{}", line)?;
                }
                if *more > 0 {
                    write!(f, "\n…and {} more", more)?;
                }
                Ok(())
            }
        }
    }
}

/// Pending tracks in play order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueListing {
    pub entries: Vec<TrackLine>,
}

impl QueueListing {
    pub fn new<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Self {
        Self {
            entries: tracks
                .into_iter()
                .enumerate()
                .map(|(i, t)| TrackLine::new(i + 1, t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for QueueListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "📜 Queue")?;
        for line in &self.entries {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}
