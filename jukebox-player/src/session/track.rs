//! Resolved playable track

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Uploader shown when the resolver does not report one
pub const UNKNOWN_UPLOADER: &str = "Unknown";

/// A resolved, playable item
///
/// Created by a resolver and never mutated afterwards. The locator is an
/// opaque stream reference handed to the voice backend; it may expire, so a
/// track is resolved shortly before it is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque playable stream reference
    pub locator: String,
    /// Display title
    pub title: String,
    /// Length in whole seconds (0 when unknown)
    pub duration_seconds: u64,
    /// Display name of the user who asked for it
    pub requester_name: String,
    /// Channel / artist that published it
    pub uploader_name: String,
}

impl Track {
    pub fn new(
        locator: impl Into<String>,
        title: impl Into<String>,
        duration_seconds: u64,
        requester_name: impl Into<String>,
        uploader_name: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            title: title.into(),
            duration_seconds,
            requester_name: requester_name.into(),
            uploader_name: uploader_name.into(),
        }
    }

    /// Track length as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }
}
