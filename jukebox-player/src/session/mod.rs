//! Sessions: tracks, per-session queues and the process-wide registry

pub mod queue;
pub mod registry;
pub mod track;

pub use queue::{SessionQueue, DEFAULT_VOLUME, MAX_VOLUME_PERCENT};
pub use registry::SessionRegistry;
pub use track::{Track, UNKNOWN_UPLOADER};
