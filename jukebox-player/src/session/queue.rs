//! Session queue
//!
//! Strict FIFO of pending tracks plus the session volume. Owned by exactly
//! one playback controller; every mutation happens on that controller's task.

use crate::error::{Error, Result};
use crate::session::Track;
use std::collections::VecDeque;

/// Default gain factor (100%)
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Highest accepted volume, in percent
pub const MAX_VOLUME_PERCENT: i64 = 200;

/// Pending tracks and volume for one session
#[derive(Debug, Clone)]
pub struct SessionQueue {
    /// Insertion order is play order
    tracks: VecDeque<Track>,

    /// Gain factor in [0.0, 2.0], read when a stream starts
    volume: f32,
}

impl SessionQueue {
    /// Create empty queue at default volume
    pub fn new() -> Self {
        Self {
            tracks: VecDeque::new(),
            volume: DEFAULT_VOLUME,
        }
    }

    /// Append one track to the end
    pub fn enqueue(&mut self, track: Track) {
        self.tracks.push_back(track);
    }

    /// Append tracks, preserving their order
    pub fn enqueue_all(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Remove and return the head of the queue
    pub fn advance(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Remove everything; returns how many tracks were dropped
    pub fn clear(&mut self) -> usize {
        let removed = self.tracks.len();
        self.tracks.clear();
        removed
    }

    /// Pending track count
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Pending tracks in play order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Current gain factor
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set volume from a user-facing percentage (0-200).
    ///
    /// Out-of-range values are rejected and leave the volume unchanged.
    /// Returns the new gain factor.
    pub fn set_volume_percent(&mut self, percent: i64) -> Result<f32> {
        if !(0..=MAX_VOLUME_PERCENT).contains(&percent) {
            return Err(Error::InvalidVolume(percent));
        }
        self.volume = percent as f32 / 100.0;
        Ok(self.volume)
    }
}

impl Default for SessionQueue {
    fn default() -> Self {
        Self::new()
    }
}
