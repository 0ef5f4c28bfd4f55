//! Error types for jukebox-player
//!
//! One variant per failure class the orchestrator distinguishes. Every
//! variant maps to a short user-facing message via [`Error::user_message`];
//! raw internal detail stays in the logs.

use thiserror::Error;

/// Main error type for jukebox-player
#[derive(Error, Debug)]
pub enum Error {
    /// External resolver failed for one query
    #[error("Resolution failed for '{query}': {reason}")]
    Resolution { query: String, reason: String },

    /// Every query of a request failed to resolve
    #[error("Nothing found for '{0}'")]
    NothingFound(String),

    /// A catalog link could not be parsed or expanded
    #[error("Catalog link error: {0}")]
    CatalogLink(String),

    /// Control command invoked in a state that does not support it
    #[error("Invalid control: {0}")]
    InvalidControl(String),

    /// Queue listing requested while nothing is pending
    #[error("Queue is empty")]
    EmptyQueue,

    /// Volume outside 0-200 percent
    #[error("Invalid volume: {0}% (expected 0-200)")]
    InvalidVolume(i64),

    /// Requester is not in a voice channel
    #[error("Requester is not in a voice channel")]
    NotInVoiceChannel,

    /// Voice link could not be established or moved
    #[error("Voice connection error: {0}")]
    Connection(String),

    /// Media transport failed to start or run a stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// Chat platform refused a display/reaction operation
    #[error("Chat error: {0}")]
    Chat(String),

    /// Session controller task is gone
    #[error("Session {0} is unavailable")]
    SessionUnavailable(jukebox_common::SessionId),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short, non-technical message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            Error::Resolution { query, .. } => format!("Could not load \"{}\".", query),
            Error::NothingFound(_) => {
                "No song found, or the link was blocked by the provider. Try another link."
                    .to_string()
            }
            Error::CatalogLink(_) => "Unable to read this catalog link.".to_string(),
            Error::InvalidControl(message) => message.clone(),
            Error::EmptyQueue => "The queue is empty.".to_string(),
            Error::InvalidVolume(_) => "Please choose a volume between 0 and 200.".to_string(),
            Error::NotInVoiceChannel => "You need to be in a voice channel.".to_string(),
            Error::Connection(_) => "Could not join the voice channel.".to_string(),
            Error::Stream(_) => "Playback failed for this track.".to_string(),
            Error::Chat(_)
            | Error::SessionUnavailable(_)
            | Error::Config(_)
            | Error::Http(_)
            | Error::Io(_)
            | Error::Internal(_) => "Something went wrong, please try again.".to_string(),
        }
    }

    /// Expected outcomes of user input; logged at debug, never as errors
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Error::InvalidControl(_)
                | Error::EmptyQueue
                | Error::InvalidVolume(_)
                | Error::NothingFound(_)
                | Error::NotInVoiceChannel
        )
    }
}

impl From<jukebox_common::Error> for Error {
    fn from(err: jukebox_common::Error) -> Self {
        match err {
            jukebox_common::Error::Io(e) => Error::Io(e),
            other => Error::Config(other.to_string()),
        }
    }
}

/// Convenience Result type using jukebox-player Error
pub type Result<T> = std::result::Result<T, Error>;
