//! # Jukebox Player Library (jukebox-player)
//!
//! Per-session music playback orchestrator.
//!
//! **Purpose:** Keep an ordered queue per session, drive one voice stream at
//! a time, and expose a reaction-based control surface (pause/skip/stop) on
//! the now-playing display.
//!
//! **Architecture:** One controller task per session owns its queue, state
//! and voice link; everything else (commands, control surfaces, stream
//! completions from the media context) talks to it by message.

pub mod api;
pub mod config;
pub mod control;
pub mod error;
pub mod jukebox;
pub mod playback;
pub mod presentation;
pub mod resolve;
pub mod session;
pub mod voice;

pub use error::{Error, Result};
pub use jukebox::{Jukebox, PlayOutcome, PlayRequest};
