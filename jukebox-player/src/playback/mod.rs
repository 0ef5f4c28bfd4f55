//! Playback controller and its messages

pub mod command;
pub mod completion;
pub mod controller;
pub mod handle;
pub mod state;

pub use command::{EnqueueReceipt, PauseToggle, StopReport, StreamOutcome};
pub use completion::CompletionNotifier;
pub use controller::{ControllerSettings, PlaybackController, PlaybackServices, DEFAULT_GRACE};
pub use handle::SessionHandle;
pub use state::{PlaybackState, SessionSnapshot, StreamStatus};
